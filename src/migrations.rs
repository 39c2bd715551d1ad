//! Embedded schema migrations.

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPool;
use tracing::info;

static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("migrations/postgres");

/// Apply pending migrations. Safe to run repeatedly.
pub async fn run_postgres(pool: &PgPool) -> anyhow::Result<()> {
    POSTGRES_MIGRATOR.run(pool).await?;
    info!("database migrations applied");
    Ok(())
}
