//! Server bootstrap: configuration, tracing, pool, router, listener.

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{api_router, AppState};
use crate::auth::{AuthMiddlewareState, JwtValidator, RateLimiter};
use crate::domain::VoucherCatalog;
use crate::infra::{
    FsArtifactStore, HtmlCertificateRenderer, PgProofLedger, PgReportLedger, PgUserStore,
    PgVoucherLedger,
};

/// Server configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_db_connections: u32,
    pub jwt_secret: String,
    pub upload_dir: String,
    pub voucher_catalog_path: Option<String>,
    pub cors_allow_origins: Option<String>,
    pub rate_limit_per_minute: Option<u32>,
    pub migrate_on_startup: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.len() < 16 {
            anyhow::bail!("JWT_SECRET must be at least 16 bytes");
        }

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid port number")?;
        let max_db_connections = std::env::var("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("MAX_DB_CONNECTIONS must be a number")?;
        let upload_dir =
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let voucher_catalog_path = std::env::var("VOUCHER_CATALOG_PATH").ok();
        let cors_allow_origins = std::env::var("CORS_ALLOW_ORIGINS").ok();
        let rate_limit_per_minute = match std::env::var("RATE_LIMIT_PER_MINUTE") {
            Ok(v) => Some(v.parse().context("RATE_LIMIT_PER_MINUTE must be a number")?),
            Err(_) => None,
        };
        let migrate_on_startup = std::env::var("DB_MIGRATE_ON_STARTUP")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            host,
            port,
            max_db_connections,
            jwt_secret,
            upload_dir,
            voucher_catalog_path,
            cors_allow_origins,
            rate_limit_per_minute,
            migrate_on_startup,
        })
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,verdantia=debug,tower_http=info"));

    fmt().with_env_filter(filter).with_target(true).init();
}

/// Cross-origin policy from `CORS_ALLOW_ORIGINS`: unset means no CORS
/// layer, `*` allows any origin, otherwise a comma-separated origin list.
fn cors_layer(config: &Config) -> Option<CorsLayer> {
    let raw = config.cors_allow_origins.as_deref()?;

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let layer = if raw.trim() == "*" {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = raw
            .split(',')
            .filter_map(|o| o.trim().parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    };

    Some(layer)
}

/// Assemble application state and the router from an existing pool.
pub fn build_app(config: &Config, pool: PgPool) -> anyhow::Result<axum::Router> {
    let catalog = match &config.voucher_catalog_path {
        Some(path) => VoucherCatalog::from_json_file(std::path::Path::new(path))
            .with_context(|| format!("loading voucher catalog from {path}"))?,
        None => VoucherCatalog::builtin(),
    };
    info!(offers = catalog.len(), "voucher catalog loaded");

    let jwt = Arc::new(JwtValidator::new(
        config.jwt_secret.as_bytes(),
        "verdantia",
        "verdantia-api",
    ));

    let state = AppState {
        pool: pool.clone(),
        users: Arc::new(PgUserStore::new(pool.clone())),
        reports: Arc::new(PgReportLedger::new(pool.clone())),
        uploads: Arc::new(PgProofLedger::new(pool.clone())),
        vouchers: Arc::new(PgVoucherLedger::new(pool)),
        artifacts: Arc::new(FsArtifactStore::new(&config.upload_dir)?),
        certificates: Arc::new(HtmlCertificateRenderer::default()),
        catalog: Arc::new(catalog),
        jwt: jwt.clone(),
        leaderboard_limit: 10,
    };

    let auth_state = AuthMiddlewareState {
        jwt_validator: jwt,
        rate_limiter: config
            .rate_limit_per_minute
            .map(|n| Arc::new(RateLimiter::new(n))),
    };

    let mut router = api_router(state, auth_state).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(config) {
        router = router.layer(cors);
    }

    Ok(router)
}

/// Run the server until the process is terminated.
pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    if config.migrate_on_startup {
        crate::migrations::run_postgres(&pool).await?;
    }

    let app = build_app(&config, pool)?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid HOST/PORT combination")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "verdantia listening");

    axum::serve(listener, app).await?;
    Ok(())
}
