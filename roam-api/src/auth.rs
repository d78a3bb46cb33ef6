use crate::error::AppError;
use crate::middleware::auth::CustomerClaims;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use roam_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct OtpRequest {
    phone: String,
}

#[derive(Debug, Deserialize)]
struct OtpVerifyRequest {
    phone: String,
    code: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/guest", post(login_guest))
        .route("/v1/auth/otp/request", post(request_otp))
        .route("/v1/auth/otp/verify", post(verify_otp))
}

fn issue_customer_token(state: &AppState, customer_id: Uuid) -> Result<String, AppError> {
    let claims = CustomerClaims {
        sub: customer_id.to_string(),
        email: None,
        role: "Customer".to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Authentication(format!("Token encoding failed: {}", e)))
}

async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let customer = state.customers.register(None).await?;
    let token = issue_customer_token(&state, customer.id)?;
    Ok(Json(AuthResponse { token }))
}

async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let code = format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000);
    state
        .redis
        .set_otp(&req.phone, &code, state.booking_rules.otp_ttl_seconds)
        .await
        .map_err(AppError::internal)?;

    if let Err(err) = state
        .sms
        .send(&req.phone, &format!("Your login code is {}", code))
        .await
    {
        tracing::warn!("Failed to send OTP to {}: {}", Masked(&req.phone), err);
    }

    Ok(Json(serde_json::json!({ "status": "sent" })))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpVerifyRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let stored = state
        .redis
        .get_otp(&req.phone)
        .await
        .map_err(AppError::internal)?;

    match stored {
        Some(code) if code == req.code => {}
        _ => return Err(AppError::Authentication("invalid or expired code".into())),
    }
    // Single use.
    state
        .redis
        .del_otp(&req.phone)
        .await
        .map_err(AppError::internal)?;

    // Re-verifying a known number logs into the same customer.
    let customer = state.customers.register(Some(&req.phone)).await?;
    let session_id = Uuid::new_v4().to_string();
    state
        .redis
        .set_session(
            &session_id,
            &customer.id.to_string(),
            state.booking_rules.session_ttl_seconds,
        )
        .await
        .map_err(AppError::internal)?;

    let token = issue_customer_token(&state, customer.id)?;
    Ok(Json(AuthResponse { token }))
}
