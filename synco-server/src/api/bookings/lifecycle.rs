//! Booking transition endpoints

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use shared::error::ApiResponse;
use shared::util::now_millis;

use crate::auth::AdminIdentity;
use crate::db;
use crate::email::{Recipient, templates};
use crate::services::transitions::{
    self, CancelRequest, ConvertRequest, ConvertedBooking, FreezeRequest, ReactivateRequest,
    StudentUpdate, TransferRequest, TrialOutcomeRequest,
};
use crate::state::AppState;

use super::super::ApiResult;

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// POST /api/admin/bookings/{ref}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<CancelRequest>,
) -> ApiResult<()> {
    let cancellation_type = req.cancellation_type;
    transitions::cancel(&state, &booking_ref, req, today()).await?;

    send_cancellation_notice(&state, &booking_ref).await;

    let detail = json!({ "booking_ref": booking_ref, "type": cancellation_type.as_db() });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_cancelled",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Booking cancellation recorded."))
}

/// POST /api/admin/bookings/{ref}/apply-cancellation
///
/// Operator-triggered flip for a scheduled cancellation that has come due.
pub async fn apply_cancellation(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
) -> ApiResult<()> {
    transitions::apply_due_cancellation(&state, &booking_ref).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_cancellation_applied",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Booking cancelled."))
}

/// PATCH /api/admin/bookings/{ref}/freeze
pub async fn freeze(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<FreezeRequest>,
) -> ApiResult<()> {
    transitions::freeze(&state, &booking_ref, req, today()).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_frozen",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Booking frozen."))
}

/// PATCH /api/admin/bookings/{ref}/reactivate
pub async fn reactivate(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<ReactivateRequest>,
) -> ApiResult<()> {
    transitions::reactivate(&state, &booking_ref, req, today()).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_reactivated",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Booking reactivated."))
}

/// PATCH /api/admin/bookings/{ref}/transfer
pub async fn transfer(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<()> {
    transitions::transfer(&state, &booking_ref, req).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_transferred",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Booking transferred."))
}

#[derive(Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: String,
}

/// POST /api/admin/bookings/{ref}/remove
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> ApiResult<()> {
    transitions::remove_from_waiting_list(&state, &booking_ref, req.reason).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "waiting_list_removed",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Removed from waiting list."))
}

/// POST /api/admin/bookings/{ref}/no-membership
pub async fn no_membership(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<ReasonRequest>,
) -> ApiResult<()> {
    transitions::mark_no_membership(&state, &booking_ref, req.reason).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_no_membership",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Booking marked as no membership."))
}

/// PATCH /api/admin/bookings/{ref}/trial-outcome
pub async fn trial_outcome(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<TrialOutcomeRequest>,
) -> ApiResult<()> {
    let outcome = req.status;
    transitions::record_trial_outcome(&state, &booking_ref, req).await?;

    let detail = json!({ "booking_ref": booking_ref, "outcome": outcome });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "trial_outcome_recorded",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Trial outcome recorded."))
}

/// POST /api/admin/bookings/{ref}/convert
pub async fn convert(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<ConvertRequest>,
) -> ApiResult<ConvertedBooking> {
    let converted = transitions::convert_to_membership(&state, &booking_ref, req).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_converted",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::success_with_message(
        "Booking converted to membership.",
        converted,
    ))
}

/// PATCH /api/admin/bookings/{ref}/students
pub async fn update_students(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(booking_ref): Path<String>,
    Json(req): Json<Vec<StudentUpdate>>,
) -> ApiResult<()> {
    transitions::update_booking_students(&state, &booking_ref, req).await?;

    let detail = json!({ "booking_ref": booking_ref });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "booking_students_updated",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Booking students updated."))
}

#[derive(Deserialize)]
pub struct DueQuery {
    pub as_of: Option<NaiveDate>,
}

/// GET /api/admin/bookings/due-cancellations?as_of=YYYY-MM-DD
pub async fn due_cancellations(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> ApiResult<Vec<db::bookings::DueCancellation>> {
    let as_of = query.as_of.unwrap_or_else(today);
    let due = db::bookings::due_cancellations(&state.pool, as_of)
        .await
        .map_err(|e| {
            tracing::error!("Due cancellations query error: {e}");
            shared::error::AppError::new(shared::error::ErrorCode::InternalError)
        })?;
    Ok(ApiResponse::success(due))
}

/// Best-effort cancellation notice to every parent on the booking
async fn send_cancellation_notice(state: &AppState, booking_ref: &str) {
    let detail = match db::booking_queries::find_by_ref(&state.pool, booking_ref).await {
        Ok(Some(d)) => d,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping cancellation notice, booking reload failed");
            return;
        }
    };
    let b = &detail.booking;
    for student in &detail.students {
        for parent in &student.parents {
            let name = format!("{} {}", parent.first_name, parent.last_name);
            let html = templates::render(
                templates::CANCELLATION_NOTICE,
                &[
                    ("parentName", name.as_str()),
                    ("bookingRef", b.booking_ref.as_str()),
                    ("className", b.class_name.as_str()),
                    ("venueName", b.venue_name.as_str()),
                ],
            );
            let recipient = Recipient {
                name,
                email: parent.email.clone(),
            };
            state
                .mailer
                .send_to_all(std::slice::from_ref(&recipient), "Booking cancelled", &html)
                .await;
        }
    }
}
