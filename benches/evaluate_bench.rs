//! Benchmarks for the compliance evaluator and recommendation lookup.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use verdantia::domain::{evaluate, recommend};

fn bench_evaluate(c: &mut Criterion) {
    c.bench_function("evaluate_compliance", |b| {
        b.iter(|| {
            evaluate(
                black_box(12_345.6),
                black_box(150),
                black_box(Some(1_300.0)),
            )
        })
    });

    c.bench_function("evaluate_without_green_cover", |b| {
        b.iter(|| evaluate(black_box(800.0), black_box(10), black_box(None)))
    });
}

fn bench_recommend(c: &mut Criterion) {
    c.bench_function("recommend_site", |b| {
        b.iter(|| recommend(black_box(28.6), black_box(77.2)))
    });
}

criterion_group!(benches, bench_evaluate, bench_recommend);
criterion_main!(benches);
