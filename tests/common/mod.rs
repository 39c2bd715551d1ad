//! Common test utilities and fixtures for integration tests
//!
//! Integration tests need a PostgreSQL instance; they skip themselves
//! when `DATABASE_URL` is not set.

#![allow(dead_code)]

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use uuid::Uuid;

use verdantia::api::AppState;
use verdantia::auth::{hash_password, AuthMiddlewareState, JwtValidator};
use verdantia::domain::{Role, User, VoucherCatalog};
use verdantia::infra::{
    FsArtifactStore, HtmlCertificateRenderer, PgProofLedger, PgReportLedger, PgUserStore,
    PgVoucherLedger,
};

pub const TEST_JWT_SECRET: &[u8] = b"test-secret-key-for-testing-only";

/// Connect to the test database, or `None` when DATABASE_URL is unset.
pub async fn connect_db() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .ok()?;
    verdantia::migrations::run_postgres(&pool).await.ok()?;
    Some(pool)
}

/// A username that cannot collide across test runs.
pub fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Create an account directly through the store.
pub async fn create_user(pool: &PgPool, prefix: &str, role: Role) -> User {
    let store = PgUserStore::new(pool.clone());
    let hash = hash_password("correct-horse-battery").unwrap();
    store
        .create(&unique_username(prefix), &hash, role)
        .await
        .unwrap()
}

/// Everything a router-level test needs, including the artifact temp dir
/// which must outlive the router.
pub struct TestApp {
    pub router: axum::Router,
    pub state: AppState,
    pub jwt: Arc<JwtValidator>,
    _artifact_dir: tempfile::TempDir,
}

pub fn test_app(pool: PgPool) -> TestApp {
    let artifact_dir = tempfile::tempdir().unwrap();
    let jwt = Arc::new(JwtValidator::new(TEST_JWT_SECRET, "verdantia", "verdantia-api"));

    let state = AppState {
        pool: pool.clone(),
        users: Arc::new(PgUserStore::new(pool.clone())),
        reports: Arc::new(PgReportLedger::new(pool.clone())),
        uploads: Arc::new(PgProofLedger::new(pool.clone())),
        vouchers: Arc::new(PgVoucherLedger::new(pool)),
        artifacts: Arc::new(FsArtifactStore::new(artifact_dir.path()).unwrap()),
        certificates: Arc::new(HtmlCertificateRenderer::default()),
        catalog: Arc::new(VoucherCatalog::builtin()),
        jwt: jwt.clone(),
        leaderboard_limit: 10,
    };

    let auth_state = AuthMiddlewareState {
        jwt_validator: jwt.clone(),
        rate_limiter: None,
    };

    TestApp {
        router: verdantia::api::api_router(state.clone(), auth_state),
        state,
        jwt,
        _artifact_dir: artifact_dir,
    }
}

/// Issue a valid token for an existing user.
pub fn token_for(app: &TestApp, user: &User) -> String {
    app.jwt
        .issue(&user.id, &user.username, user.role, chrono::Duration::hours(1))
        .unwrap()
}

/// Build a minimal multipart body with a single `file` field.
pub fn multipart_body(boundary: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
