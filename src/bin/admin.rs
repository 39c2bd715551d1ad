//! Operational CLI: migrations and account provisioning.
//!
//! Registration through the API only creates participants, so authority
//! accounts are provisioned here.

use anyhow::Context;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use verdantia::auth::hash_password;
use verdantia::domain::Role;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    verdantia::server::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("migrate") => {
            let pool = connect().await?;
            verdantia::migrations::run_postgres(&pool).await?;
            println!("migrations applied");
        }
        Some("seed") => {
            let pool = connect().await?;
            verdantia::migrations::run_postgres(&pool).await?;
            upsert_user(&pool, "user1", "user123", Role::Participant).await?;
            upsert_user(&pool, "gov1", "gov123", Role::Authority).await?;
            println!("demo accounts seeded");
        }
        Some("create-user") => {
            let username = args.get(2).context("usage: admin create-user <username> <password> <role>")?;
            let password = args.get(3).context("missing password")?;
            let role = match args.get(4).map(String::as_str) {
                Some("authority") => Role::Authority,
                Some("participant") | None => Role::Participant,
                Some(other) => anyhow::bail!("unknown role {other:?} (participant|authority)"),
            };
            let pool = connect().await?;
            upsert_user(&pool, username, password, role).await?;
            println!("user {username} ({}) ready", role.as_str());
        }
        _ => print_help(),
    }

    Ok(())
}

async fn connect() -> anyhow::Result<PgPool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("failed to connect to PostgreSQL")
}

/// Create or update an account with a freshly hashed password.
async fn upsert_user(pool: &PgPool, username: &str, password: &str, role: Role) -> anyhow::Result<()> {
    let password_hash = hash_password(password)?;

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, role, points)
        VALUES ($1, $2, $3, $4, 0)
        ON CONFLICT (username)
        DO UPDATE SET password_hash = EXCLUDED.password_hash, role = EXCLUDED.role
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

fn print_help() {
    println!("verdantia-admin");
    println!();
    println!("USAGE:");
    println!("    verdantia-admin <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    migrate                                     apply pending database migrations");
    println!("    seed                                        migrate and create the demo accounts");
    println!("    create-user <username> <password> [role]    create or update an account");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL    PostgreSQL connection string (required)");
}
