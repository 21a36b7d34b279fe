//! Booking list and detail endpoints

use axum::extract::{Path, Query, State};
use serde_json::{Value, json};

use shared::error::{ApiResponse, AppError, ErrorCode};

use crate::db::booking_queries::{self, BookingFilters};
use crate::state::AppState;

use super::super::ApiResult;

/// GET /api/admin/bookings?status=&venue_id=&venue_name=&booked_by=&student_name=&date_booked=&from_date=&to_date=&date_from=&date_to=
///
/// Loads every matching booking (no pagination) and returns the rows plus
/// summary statistics over the filtered set.
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<BookingFilters>,
) -> ApiResult<Value> {
    let rows = booking_queries::list(&state.pool, &filters)
        .await
        .map_err(|e| {
            tracing::error!("Booking list query error: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    let stats = booking_queries::compute_stats(&rows);

    Ok(ApiResponse::success(json!({
        "bookings": rows,
        "stats": stats,
    })))
}

/// GET /api/admin/bookings/{ref}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_ref): Path<String>,
) -> ApiResult<booking_queries::BookingDetail> {
    let detail = booking_queries::find_by_ref(&state.pool, &booking_ref)
        .await
        .map_err(|e| {
            tracing::error!("Booking detail query error: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;

    Ok(ApiResponse::success(detail))
}
