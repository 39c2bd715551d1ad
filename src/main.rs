use verdantia::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init_tracing();
    server::run().await
}
