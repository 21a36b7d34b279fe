//! Payment retry endpoint

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::PaymentStatus;
use shared::util::now_millis;

use crate::auth::AdminIdentity;
use crate::db;
use crate::services::payment::{self, PaymentDetailsInput, RetryOutcome};
use crate::state::AppState;

use super::super::ApiResult;

#[derive(Default, Deserialize)]
pub struct RetryRequest {
    pub payment: Option<PaymentDetailsInput>,
}

/// POST /api/admin/bookings/{ref}/retry-payment
///
/// A failed retry is recorded (committed) and reported as a failure; a retry
/// against an already-paid booking short-circuits without a gateway call.
pub async fn retry_payment(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<RetryRequest>,
) -> ApiResult<RetryOutcome> {
    let outcome = payment::retry_payment(&state, &booking_ref, req.payment).await?;

    let detail = json!({
        "booking_ref": booking_ref,
        "status": outcome.payment_status,
        "already_paid": outcome.already_paid,
    });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "payment_retried",
        Some(&detail),
        now_millis(),
    )
    .await;

    if outcome.payment_status == PaymentStatus::Failed {
        let msg = outcome
            .message
            .clone()
            .unwrap_or_else(|| ErrorCode::PaymentFailed.message().to_string());
        return Err(AppError::payment_failed(msg));
    }

    let message = if outcome.already_paid {
        "Payment already completed."
    } else {
        "Payment retry submitted."
    };
    Ok(ApiResponse::success_with_message(message, outcome))
}
