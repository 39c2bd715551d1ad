//! Registration, login and the current-account view.
//!
//! Registration always creates a participant; authority accounts are
//! provisioned out of band via the admin CLI. Login failures are
//! uniform: an unknown username and a wrong password produce the same
//! response.

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Duration;
use tracing::info;

use crate::api::error::{ApiError, ErrorCode};
use crate::api::rest::AppState;
use crate::api::schemas::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::auth::{hash_password, verify_password, AuthContextExt, AuthError, TOKEN_TTL_HOURS};
use crate::domain::Role;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::new(
            ErrorCode::InvalidFieldValue,
            "username is required",
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::new(
            ErrorCode::InvalidFieldValue,
            "password must be at least 8 characters",
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(username, &password_hash, Role::Participant)
        .await?;

    info!(username = %user.username, "account registered");

    let token = state.jwt.issue(
        &user.id,
        &user.username,
        user.role,
        Duration::hours(TOKEN_TTL_HOURS),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.jwt.issue(
        &user.id,
        &user.username,
        user.role,
        Duration::hours(TOKEN_TTL_HOURS),
    )?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// The caller's own account, including the live points balance.
pub async fn me(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or(crate::infra::CoreError::NotFound("user"))?;

    Ok(Json(user.into()))
}
