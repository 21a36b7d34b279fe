//! Reference-data endpoints: venues, class schedules, payment plans

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::util::now_millis;

use crate::auth::AdminIdentity;
use crate::db;
use crate::state::AppState;

use super::ApiResult;

/// GET /api/admin/venues
pub async fn list_venues(
    State(state): State<AppState>,
) -> ApiResult<Vec<db::venues::Venue>> {
    let venues = db::venues::list(&state.pool).await.map_err(|e| {
        tracing::error!("Venue list query error: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    Ok(ApiResponse::success(venues))
}

/// GET /api/admin/class-schedules
pub async fn list_class_schedules(
    State(state): State<AppState>,
) -> ApiResult<Vec<db::class_schedules::ClassSchedule>> {
    let schedules = db::class_schedules::list(&state.pool).await.map_err(|e| {
        tracing::error!("Class schedule list query error: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    Ok(ApiResponse::success(schedules))
}

/// GET /api/admin/payment-plans
pub async fn list_payment_plans(
    State(state): State<AppState>,
) -> ApiResult<Vec<db::payment_plans::PaymentPlan>> {
    let plans = db::payment_plans::list(&state.pool).await.map_err(|e| {
        tracing::error!("Payment plan list query error: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;
    Ok(ApiResponse::success(plans))
}

#[derive(Deserialize)]
pub struct SetCapacityRequest {
    pub capacity: i32,
}

/// PATCH /api/admin/class-schedules/{id}/capacity
///
/// Cancellations never restore capacity automatically; this is the manual
/// administrative override.
pub async fn set_capacity(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<SetCapacityRequest>,
) -> ApiResult<()> {
    if req.capacity < 0 {
        return Err(AppError::validation("Capacity cannot be negative."));
    }

    let mut conn = state
        .pool
        .acquire()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    let updated = db::class_schedules::set_capacity(&mut conn, id, req.capacity, now_millis())
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    if updated == 0 {
        return Err(AppError::new(ErrorCode::ClassNotFound));
    }

    let detail = json!({ "class_schedule_id": id, "capacity": req.capacity });
    let _ = db::audit::log(
        &state.pool,
        Some(identity.account_id),
        "class_capacity_set",
        Some(&detail),
        now_millis(),
    )
    .await;

    Ok(ApiResponse::ok("Class capacity updated."))
}
