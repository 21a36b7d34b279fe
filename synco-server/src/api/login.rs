//! Staff login

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use shared::error::{ApiResponse, AppError};

use crate::auth::create_token;
use crate::db;
use crate::state::AppState;
use crate::util;

use super::ApiResult;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Value> {
    let email = req.email.trim().to_lowercase();

    let mut conn = state
        .pool
        .acquire()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    let account = db::accounts::find_by_email(&mut conn, &email)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(AppError::invalid_credentials)?;

    if !util::verify_password(&req.password, &account.password_hash) {
        return Err(AppError::invalid_credentials());
    }

    let token = create_token(account.id, &account.email, account.role_id, &state.jwt_secret)
        .map_err(|e| AppError::internal(format!("Token creation failed: {e}")))?;

    tracing::info!(account_id = account.id, "Login succeeded");

    Ok(ApiResponse::success_with_message(
        "Login successful.",
        json!({
            "token": token,
            "account": {
                "id": account.id,
                "email": account.email,
                "first_name": account.first_name,
                "last_name": account.last_name,
                "role_id": account.role_id,
            }
        }),
    ))
}
