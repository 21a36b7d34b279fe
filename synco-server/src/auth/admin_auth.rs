//! Admin JWT authentication for the management API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

/// JWT claims for admin authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Account id
    pub sub: i64,
    /// Account email
    pub email: String,
    /// Role id
    pub role_id: i32,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated admin identity extracted from the JWT
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub account_id: i64,
    pub email: String,
    pub role_id: i32,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for an account
pub fn create_token(
    account_id: i64,
    email: &str,
    role_id: i32,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = AdminClaims {
        sub: account_id,
        email: email.to_string(),
        role_id,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Middleware that extracts and verifies the admin JWT from the
/// Authorization header
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let validation = Validation::default();
    let token_data = jsonwebtoken::decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        AppError::with_message(ErrorCode::TokenInvalid, "Invalid or expired token").into_response()
    })?;

    let identity = AdminIdentity {
        account_id: token_data.claims.sub,
        email: token_data.claims.email,
        role_id: token_data.claims.role_id,
    };

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
