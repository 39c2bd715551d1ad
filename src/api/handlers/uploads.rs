//! Proof uploads: multipart submission, review, approval with the fixed
//! reward, deletion with reversal, and artifact serving.

use axum::extract::{Extension, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::error::{invalid_body, ApiError, ErrorCode};
use crate::api::rest::AppState;
use crate::auth::AuthContextExt;
use crate::domain::ProofUpload;
use crate::infra::{extension_allowed, extension_of, stored_filename, ALLOWED_EXTENSIONS};

pub async fn submit(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid_body(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let original = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| invalid_body(format!("failed to read upload: {e}")))?;
            file = Some((original, bytes.to_vec()));
        }
    }

    let Some((original, bytes)) = file else {
        return Err(invalid_body("multipart field 'file' is required"));
    };
    if bytes.is_empty() {
        return Err(invalid_body("uploaded file is empty"));
    }

    let accepted = extension_of(&original)
        .map(|ext| extension_allowed(&ext))
        .unwrap_or(false);
    if !accepted {
        return Err(ApiError::new(
            ErrorCode::UnsupportedMediaType,
            format!("accepted extensions: {}", ALLOWED_EXTENSIONS.join(", ")),
        ));
    }

    let stored = stored_filename(&auth.user_id, Utc::now().timestamp(), &original);
    state.artifacts.save(&stored, &bytes).await?;

    let upload = match state.uploads.submit(&auth.user_id, &stored).await {
        Ok(upload) => upload,
        Err(e) => {
            // Avoid orphaned artifacts when the ledger insert fails.
            if let Err(cleanup) = state.artifacts.remove(&stored).await {
                warn!(artifact = %stored, error = %cleanup, "failed to clean up artifact");
            }
            return Err(e.into());
        }
    };

    info!(upload_id = %upload.id, owner = %auth.username, artifact = %stored, "proof uploaded");

    Ok((StatusCode::CREATED, Json(upload)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<Vec<ProofUpload>>, ApiError> {
    Ok(Json(state.uploads.list_mine(&auth.user_id).await?))
}

pub async fn list_pending(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<Vec<ProofUpload>>, ApiError> {
    auth.require_authority()?;
    Ok(Json(state.uploads.list_pending().await?))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProofUpload>, ApiError> {
    auth.require_authority()?;
    let upload = state.uploads.approve(id).await?;
    info!(upload_id = %id, approver = %auth.username, "upload approved");
    Ok(Json(upload))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let filename = state.uploads.delete(&auth.user_id, id).await?;

    // The record and any reversal are already committed; artifact removal
    // failure is logged but never reported as a failed deletion.
    if let Err(e) = state.artifacts.remove(&filename).await {
        warn!(upload_id = %id, artifact = %filename, error = %e, "failed to remove artifact");
    }

    info!(upload_id = %id, owner = %auth.username, "upload deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Serve a stored artifact. The name is validated by the store before it
/// touches the filesystem; unsafe names and misses are both not-found to
/// avoid probing.
pub async fn serve_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = match state.artifacts.open(&filename).await {
        Ok(bytes) => bytes,
        Err(crate::infra::CoreError::Validation(_)) => {
            return Err(crate::infra::CoreError::NotFound("artifact").into())
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        bytes,
    ))
}

fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
