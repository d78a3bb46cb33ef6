use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use roam_core::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct ValidateRequest {
    code: String,
    amount: i64,
    tour_id: Uuid,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    code: String,
    discount: i64,
    final_amount: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/offers/validate", post(validate_offer))
}

/// Pre-checkout coupon check. Read-only: the usage counter only moves
/// when a verified booking actually redeems the code.
async fn validate_offer(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let offer = state
        .offers
        .get_by_code(&req.code)
        .await?
        .ok_or_else(|| CoreError::NotFound("coupon not found".into()))?;
    let tour = state
        .tours
        .get(req.tour_id)
        .await?
        .ok_or_else(|| CoreError::NotFound("tour not found".into()))?;

    let validation = roam_offer::validate(&offer, req.amount, &tour, Utc::now().date_naive())
        .map_err(CoreError::from)?;

    Ok(Json(ValidateResponse {
        code: offer.code,
        discount: validation.discount,
        final_amount: (req.amount - validation.discount).max(0),
    }))
}
