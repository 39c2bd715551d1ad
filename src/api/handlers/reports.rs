//! Compliance report workflow: submit, list, delete, approve, and the
//! certificate download.

use axum::extract::{Extension, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::error::{ApiError, ErrorCode};
use crate::api::rest::AppState;
use crate::api::schemas::ReportSubmitRequest;
use crate::auth::{AuthContext, AuthContextExt, AuthError};
use crate::domain::{ComplianceReport, ReportDraft};

pub async fn submit(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Json(req): Json<ReportSubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = ReportDraft::new(
        &req.project_name,
        &req.species_choice,
        req.area_sqm,
        req.trees_planned,
        req.green_area_sqm,
        req.lat,
        req.lon,
    )
    .map_err(|reason| ApiError::new(ErrorCode::InvalidFieldValue, reason))?;

    let report = state
        .reports
        .submit(&auth.user_id, &auth.username, draft)
        .await?;

    info!(
        report_id = %report.id,
        owner = %auth.username,
        compliant = report.result.compliant,
        "report submitted"
    );

    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<Vec<ComplianceReport>>, ApiError> {
    Ok(Json(state.reports.list_mine(&auth.user_id).await?))
}

pub async fn list_pending(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<Vec<ComplianceReport>>, ApiError> {
    auth.require_authority()?;
    Ok(Json(state.reports.list_pending().await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.reports.delete(&auth.user_id, id).await?;
    info!(report_id = %id, owner = %auth.username, "report deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComplianceReport>, ApiError> {
    auth.require_authority()?;
    let report = state.reports.approve(id).await?;
    info!(report_id = %id, approver = %auth.username, "report approved");
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct CertificateQuery {
    /// Token alternative for browser-initiated downloads, where setting
    /// an Authorization header is not possible.
    pub token: Option<String>,
}

/// Download the certificate for an approved report.
///
/// Mounted outside the auth middleware: the token may arrive either as
/// a bearer header or as a `token` query parameter. Visible to the
/// report's owner and to authorities; anyone else sees not-found.
pub async fn certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CertificateQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let auth = authenticate_flexible(&state, &headers, query.token.as_deref())?;

    let report = state.reports.get(id).await?;
    if report.owner_id != auth.user_id && !auth.is_authority() {
        return Err(crate::infra::CoreError::NotFound("report").into());
    }

    let doc = state.certificates.render(&report)?;

    Ok((
        [
            (header::CONTENT_TYPE, doc.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", doc.filename),
            ),
        ],
        doc.bytes,
    ))
}

fn authenticate_flexible(
    state: &AppState,
    headers: &HeaderMap,
    query_token: Option<&str>,
) -> Result<AuthContext, ApiError> {
    let header_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let token = header_token
        .or(query_token)
        .ok_or(AuthError::MissingAuth)?;

    Ok(state.jwt.validate(token.trim())?)
}
