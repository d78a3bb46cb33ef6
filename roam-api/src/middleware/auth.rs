use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use roam_core::identity::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerClaims {
    pub sub: String,
    pub email: Option<String>,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// Verified customer identity, injected into request extensions.
#[derive(Debug, Clone, Copy)]
pub struct CurrentCustomer {
    pub id: Uuid,
}

fn bearer_token(req: &Request) -> Result<&str, StatusCode> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)
}

pub async fn customer_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&req)?;

    let token_data = decode::<CustomerClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Legacy role spellings in old tokens normalize through the enum.
    let role =
        Role::try_from(token_data.claims.role.as_str()).map_err(|_| StatusCode::UNAUTHORIZED)?;
    if role != Role::Customer {
        return Err(StatusCode::FORBIDDEN);
    }

    let id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;
    req.extensions_mut().insert(CurrentCustomer { id });

    Ok(next.run(req).await)
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&req)?;

    let token_data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let role =
        Role::try_from(token_data.claims.role.as_str()).map_err(|_| StatusCode::UNAUTHORIZED)?;
    if !role.is_staff() {
        return Err(StatusCode::FORBIDDEN);
    }

    let id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Role comes from the verified token; active status is re-read
    // from storage so a deactivated admin is locked out immediately.
    let admin = state
        .admins
        .get(id)
        .await
        .map_err(|_| StatusCode::BAD_GATEWAY)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if !admin.is_active {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(admin);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_admin_role_claim_still_parses() {
        let role = Role::try_from("Super Admin").unwrap();
        assert_eq!(role, Role::Superadmin);
        assert!(role.is_staff());
    }
}
