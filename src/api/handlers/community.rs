//! Leaderboard and species recommendation.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::rest::AppState;
use crate::api::schemas::RecommendationRequest;
use crate::domain::{recommend, LeaderboardRow, Recommendation};

/// Top participants by points. Public; exposes usernames and points only.
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardRow>>, ApiError> {
    Ok(Json(state.users.leaderboard(state.leaderboard_limit).await?))
}

/// Deterministic site recommendation. No persistence, no external calls.
pub async fn recommendation(
    Json(req): Json<RecommendationRequest>,
) -> Json<Recommendation> {
    Json(recommend(req.lat, req.lon))
}
