//! Voucher catalog, redemption, and redemption history.

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use crate::api::error::{ApiError, ErrorCode};
use crate::api::rest::AppState;
use crate::api::schemas::{CatalogEntry, RedeemRequest};
use crate::auth::AuthContextExt;
use crate::domain::VoucherRedemption;

pub async fn catalog(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    let entries = state
        .catalog
        .offers()
        .map(|(id, offer)| CatalogEntry::from_offer(id, offer))
        .collect();
    Json(entries)
}

pub async fn redeem(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
    Json(req): Json<RedeemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The catalog is the only source of the debit amount.
    let voucher_id = req.voucher_id.trim();
    let offer = state.catalog.get(voucher_id).ok_or_else(|| {
        ApiError::new(
            ErrorCode::InvalidVoucher,
            format!("unknown voucher {voucher_id:?}"),
        )
    })?;

    let redemption = state
        .vouchers
        .redeem(&auth.user_id, voucher_id, offer)
        .await?;

    info!(
        owner = %auth.username,
        voucher = %redemption.voucher_id,
        value = redemption.value,
        "voucher redeemed"
    );

    Ok((StatusCode::CREATED, Json(redemption)))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(AuthContextExt(auth)): Extension<AuthContextExt>,
) -> Result<Json<Vec<VoucherRedemption>>, ApiError> {
    Ok(Json(state.vouchers.list_mine(&auth.user_id).await?))
}
