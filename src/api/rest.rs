//! REST API surface.
//!
//! Everything under `/api/v1` except registration, login, the public
//! leaderboard, and the certificate download sits behind the auth
//! middleware. Artifact serving lives at `/uploads/:filename` outside
//! the versioned prefix so stored filenames form direct URLs.

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use sqlx::postgres::PgPool;
use std::sync::Arc;

use crate::api::handlers;
use crate::auth::{auth_middleware, AuthMiddlewareState, JwtValidator};
use crate::domain::VoucherCatalog;
use crate::infra::{
    ArtifactStore, CertificateRenderer, PgProofLedger, PgReportLedger, PgUserStore,
    PgVoucherLedger,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub users: Arc<PgUserStore>,
    pub reports: Arc<PgReportLedger>,
    pub uploads: Arc<PgProofLedger>,
    pub vouchers: Arc<PgVoucherLedger>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub certificates: Arc<dyn CertificateRenderer>,
    pub catalog: Arc<VoucherCatalog>,
    pub jwt: Arc<JwtValidator>,
    pub leaderboard_limit: i64,
}

/// Ceiling for multipart proof uploads.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the full application router.
pub fn api_router(state: AppState, auth_state: AuthMiddlewareState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/leaderboard", get(handlers::community::leaderboard))
        .route(
            "/reports/:id/certificate",
            get(handlers::reports::certificate),
        );

    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/reports",
            post(handlers::reports::submit).get(handlers::reports::list_mine),
        )
        .route("/reports/pending", get(handlers::reports::list_pending))
        .route("/reports/:id", delete(handlers::reports::delete))
        .route("/reports/:id/approve", post(handlers::reports::approve))
        .route(
            "/uploads",
            post(handlers::uploads::submit).get(handlers::uploads::list_mine),
        )
        .route("/uploads/pending", get(handlers::uploads::list_pending))
        .route("/uploads/:id/approve", post(handlers::uploads::approve))
        .route("/uploads/:id", delete(handlers::uploads::delete))
        .route("/vouchers", get(handlers::vouchers::catalog))
        .route("/vouchers/redeem", post(handlers::vouchers::redeem))
        .route("/vouchers/mine", get(handlers::vouchers::list_mine))
        .route("/recommendation", post(handlers::community::recommendation))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/uploads/:filename", get(handlers::uploads::serve_artifact))
        .nest("/api/v1", public.merge(protected))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Readiness: the service is ready once the backing store answers.
async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => Ok(Json(serde_json::json!({ "status": "ready" }))),
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
