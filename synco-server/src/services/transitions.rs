//! Booking status transitions: cancel, freeze, reactivate, transfer,
//! waiting-list removal, no-membership, trial outcome, membership conversion
//!
//! Every operation loads the booking, checks the transition guard, applies
//! the status change and records the matching lifecycle event in one
//! transaction.

use chrono::NaiveDate;
use serde_json::json;
use sqlx::PgConnection;

use shared::error::{AppError, ErrorCode};
use shared::models::{
    BookingStatus, BookingType, CancellationType, LifecycleEventKind, PaymentStatus,
};
use shared::util::now_millis;

use crate::db;
use crate::db::bookings::Booking;
use crate::error::{ServiceError, ServiceResult};
use crate::services::booking::{ParentInput, StudentInput};
use crate::services::payment::{self, PaymentDetailsInput};
use crate::state::AppState;

fn parse_status(booking: &Booking) -> Result<BookingStatus, AppError> {
    BookingStatus::from_db(&booking.status)
        .ok_or_else(|| AppError::internal(format!("Unknown booking status '{}'", booking.status)))
}

fn guard_transition(current: BookingStatus, next: BookingStatus) -> Result<(), AppError> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::invalid_transition(current.as_db(), next.as_db()))
    }
}

async fn load_booking(conn: &mut PgConnection, booking_ref: &str) -> ServiceResult<Booking> {
    Ok(db::bookings::find_by_ref(conn, booking_ref)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?)
}

// ──────────────────────────── cancellation ────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct CancelRequest {
    pub cancellation_type: CancellationType,
    #[serde(default)]
    pub reason: String,
    /// Required for scheduled cancellations; must be in the future
    pub cancel_date: Option<NaiveDate>,
    pub note: Option<String>,
}

/// Immediate cancel flips the status now; scheduled cancel parks the booking
/// in `request_to_cancel` with the date stored on the event. Nothing here
/// flips scheduled cancels automatically — `due_cancellations` surfaces them.
pub async fn cancel(
    state: &AppState,
    booking_ref: &str,
    req: CancelRequest,
    today: NaiveDate,
) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;

    let next = match req.cancellation_type {
        CancellationType::Immediate => BookingStatus::Cancelled,
        CancellationType::Scheduled => BookingStatus::RequestToCancel,
    };
    guard_transition(current, next).map_err(ServiceError::App)?;

    let cancel_date = match req.cancellation_type {
        CancellationType::Immediate => None,
        CancellationType::Scheduled => {
            let date = req
                .cancel_date
                .ok_or_else(|| AppError::missing_field("Cancel date"))?;
            if date <= today {
                return Err(AppError::validation(
                    "Cancel date must be in the future for a scheduled cancellation.",
                )
                .into());
            }
            Some(date)
        }
    };

    db::bookings::update_status(&mut *tx, booking.id, next.as_db(), now).await?;
    db::lifecycle_events::upsert(
        &mut *tx,
        &db::lifecycle_events::NewLifecycleEvent {
            booking_id: booking.id,
            kind: LifecycleEventKind::Cancelled.as_db(),
            cancellation_type: Some(req.cancellation_type.as_db()),
            cancel_date,
            payload: json!({ "reason": req.reason, "note": req.note }),
            now,
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(
        booking_ref,
        cancellation_type = req.cancellation_type.as_db(),
        "Booking cancellation recorded"
    );
    Ok(())
}

/// The operator-triggered flip for a scheduled cancellation whose date has
/// arrived.
pub async fn apply_due_cancellation(state: &AppState, booking_ref: &str) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;
    guard_transition(current, BookingStatus::Cancelled).map_err(ServiceError::App)?;

    db::bookings::update_status(&mut *tx, booking.id, BookingStatus::Cancelled.as_db(), now)
        .await?;
    tx.commit().await?;
    Ok(())
}

// ──────────────────────────── freeze / reactivate ────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct FreezeRequest {
    pub freeze_start_date: NaiveDate,
    pub freeze_duration_months: u32,
    pub reason: Option<String>,
}

/// `reactivate_on = freeze_start + duration_months`, month-end clamped
pub fn compute_reactivate_on(freeze_start: NaiveDate, duration_months: u32) -> NaiveDate {
    freeze_start
        .checked_add_months(chrono::Months::new(duration_months))
        .unwrap_or(freeze_start)
}

pub async fn freeze(
    state: &AppState,
    booking_ref: &str,
    req: FreezeRequest,
    today: NaiveDate,
) -> ServiceResult<()> {
    if req.freeze_duration_months == 0 {
        return Err(AppError::validation("Freeze duration must be at least one month.").into());
    }

    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;
    guard_transition(current, BookingStatus::Frozen).map_err(ServiceError::App)?;

    if db::freezes::active_for_booking(&mut *tx, booking.id, today)
        .await?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::AlreadyFrozen).into());
    }

    let reactivate_on = compute_reactivate_on(req.freeze_start_date, req.freeze_duration_months);
    db::freezes::insert(
        &mut *tx,
        booking.id,
        req.freeze_start_date,
        req.freeze_duration_months as i32,
        reactivate_on,
        req.reason.as_deref(),
        now,
    )
    .await?;
    db::bookings::update_status(&mut *tx, booking.id, BookingStatus::Frozen.as_db(), now).await?;

    tx.commit().await?;
    tracing::info!(booking_ref, %reactivate_on, "Booking frozen");
    Ok(())
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ReactivateRequest {
    pub note: Option<String>,
}

/// Requires an active freeze row or a frozen status; deletes the freeze and
/// restores `active`.
pub async fn reactivate(
    state: &AppState,
    booking_ref: &str,
    req: ReactivateRequest,
    today: NaiveDate,
) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;

    let active_freeze = db::freezes::active_for_booking(&mut *tx, booking.id, today).await?;
    if active_freeze.is_none() && current != BookingStatus::Frozen {
        return Err(AppError::new(ErrorCode::NotFrozen).into());
    }

    db::freezes::delete_for_booking(&mut *tx, booking.id).await?;
    db::bookings::update_status(&mut *tx, booking.id, BookingStatus::Active.as_db(), now).await?;

    tx.commit().await?;
    tracing::info!(booking_ref, note = req.note.as_deref(), "Booking reactivated");
    Ok(())
}

// ──────────────────────────── transfer ────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct TransferRequest {
    pub class_schedule_id: i64,
    #[serde(default)]
    pub reason: String,
}

/// Re-points the booking at another class and its venue. Capacity on both
/// classes is left untouched.
pub async fn transfer(
    state: &AppState,
    booking_ref: &str,
    req: TransferRequest,
) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;
    if current.is_terminal() {
        return Err(
            AppError::invalid_transition(current.as_db(), current.as_db()).into(),
        );
    }

    let target = db::class_schedules::find_by_id(&mut *tx, req.class_schedule_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ClassNotFound))?;

    db::bookings::transfer_class(&mut *tx, booking.id, target.id, target.venue_id, now).await?;
    db::lifecycle_events::upsert(
        &mut *tx,
        &db::lifecycle_events::NewLifecycleEvent {
            booking_id: booking.id,
            kind: LifecycleEventKind::Transferred.as_db(),
            cancellation_type: None,
            cancel_date: None,
            payload: json!({
                "reason": req.reason,
                "from_class_schedule_id": booking.class_schedule_id,
                "to_class_schedule_id": target.id,
            }),
            now,
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(
        booking_ref,
        from = booking.class_schedule_id,
        to = target.id,
        "Booking transferred"
    );
    Ok(())
}

// ──────────────────────────── waiting-list removal ────────────────────────────

/// Removal flips both status and booking type to `removed` and records the
/// event.
pub async fn remove_from_waiting_list(
    state: &AppState,
    booking_ref: &str,
    reason: String,
) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;
    guard_transition(current, BookingStatus::RemovedFromWaitingList)
        .map_err(ServiceError::App)?;

    db::bookings::update_status_and_type(
        &mut *tx,
        booking.id,
        BookingStatus::RemovedFromWaitingList.as_db(),
        BookingType::Removed.as_db(),
        now,
    )
    .await?;
    db::lifecycle_events::upsert(
        &mut *tx,
        &db::lifecycle_events::NewLifecycleEvent {
            booking_id: booking.id,
            kind: LifecycleEventKind::Removed.as_db(),
            cancellation_type: None,
            cancel_date: None,
            payload: json!({ "reason": reason }),
            now,
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(booking_ref, "Removed from waiting list");
    Ok(())
}

// ──────────────────────────── no membership ────────────────────────────

/// Attended trial that did not convert.
pub async fn mark_no_membership(
    state: &AppState,
    booking_ref: &str,
    reason: String,
) -> ServiceResult<()> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;
    guard_transition(current, BookingStatus::NoMembership).map_err(ServiceError::App)?;

    db::bookings::update_status(&mut *tx, booking.id, BookingStatus::NoMembership.as_db(), now)
        .await?;
    db::lifecycle_events::upsert(
        &mut *tx,
        &db::lifecycle_events::NewLifecycleEvent {
            booking_id: booking.id,
            kind: LifecycleEventKind::NoMembership.as_db(),
            cancellation_type: None,
            cancel_date: None,
            payload: json!({ "reason": reason }),
            now,
        },
    )
    .await?;

    tx.commit().await?;
    tracing::info!(booking_ref, "Marked no-membership");
    Ok(())
}

// ──────────────────────────── trial outcome ────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct TrialOutcomeRequest {
    pub status: BookingStatus,
    pub reason_for_non_attendance: Option<String>,
}

/// Record the outcome of a pending trial: attended, not attend, or rebooked.
pub async fn record_trial_outcome(
    state: &AppState,
    booking_ref: &str,
    req: TrialOutcomeRequest,
) -> ServiceResult<()> {
    if !matches!(
        req.status,
        BookingStatus::Attended | BookingStatus::NotAttend | BookingStatus::Rebooked
    ) {
        return Err(AppError::validation(
            "Trial outcome must be 'attended', 'not attend' or 'rebooked'.",
        )
        .into());
    }

    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;
    guard_transition(current, req.status).map_err(ServiceError::App)?;

    db::bookings::update_trial_outcome(
        &mut *tx,
        booking.id,
        req.status.as_db(),
        req.reason_for_non_attendance.as_deref(),
        now,
    )
    .await?;

    tx.commit().await?;
    tracing::info!(booking_ref, outcome = req.status.as_db(), "Trial outcome recorded");
    Ok(())
}

// ──────────────────────────── membership conversion ────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct ConvertRequest {
    pub payment_plan_id: i64,
    pub start_date: NaiveDate,
    /// Students to update in place, matched by first+last name
    #[serde(default)]
    pub students: Vec<StudentInput>,
    /// Parents to update in place, matched by first+last name
    #[serde(default)]
    pub parents: Vec<ParentInput>,
    pub payment: Option<PaymentDetailsInput>,
}

#[derive(Debug, serde::Serialize)]
pub struct ConvertedBooking {
    pub booking_ref: String,
    pub payment_status: Option<PaymentStatus>,
}

/// Convert an existing booking (waiting-list entry or attended trial) into a
/// paid membership.
///
/// Student and parent rows are matched by name and updated in place; a name
/// that matches nothing is an explicit error, not a silent no-op — conversion
/// updates an existing enrollment and an unmatched name means operator error.
pub async fn convert_to_membership(
    state: &AppState,
    booking_ref: &str,
    req: ConvertRequest,
) -> ServiceResult<ConvertedBooking> {
    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let current = parse_status(&booking)?;
    guard_transition(current, BookingStatus::Active).map_err(ServiceError::App)?;

    let plan = db::payment_plans::find_by_id(&mut *tx, req.payment_plan_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PaymentPlanNotFound))?;

    // In-place updates of the student tree, matched by natural key
    let mut first_student_id = None;
    for s in &req.students {
        let existing =
            db::students::find_student_by_name(&mut *tx, booking.id, &s.first_name, &s.last_name)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::StudentNotFound,
                        format!(
                            "Student {} {} not found on booking {}.",
                            s.first_name, s.last_name, booking_ref
                        ),
                    )
                })?;
        first_student_id.get_or_insert(existing.id);
        let date_of_birth = s.date_of_birth.unwrap_or(existing.date_of_birth);
        db::students::update_student(
            &mut *tx,
            existing.id,
            &db::students::NewStudent {
                first_name: s.first_name.trim(),
                last_name: s.last_name.trim(),
                date_of_birth,
                age: s.age.or(existing.age),
                gender: s.gender.as_deref().or(existing.gender.as_deref()),
                medical_info: s
                    .medical_info
                    .as_deref()
                    .unwrap_or(&existing.medical_info),
            },
            now,
        )
        .await?;
    }

    if !req.parents.is_empty() {
        let student_id = match first_student_id {
            Some(id) => id,
            None => db::students::list_for_booking(&mut *tx, booking.id)
                .await?
                .first()
                .map(|s| s.id)
                .ok_or_else(|| AppError::new(ErrorCode::StudentNotFound))?,
        };
        for p in &req.parents {
            let existing = db::students::find_parent_by_name(
                &mut *tx,
                student_id,
                &p.first_name,
                &p.last_name,
            )
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ParentNotFound,
                    format!(
                        "Parent {} {} not found on booking {}.",
                        p.first_name, p.last_name, booking_ref
                    ),
                )
            })?;
            let email = if p.email.trim().is_empty() {
                existing.email.clone()
            } else {
                p.email.trim().to_lowercase()
            };
            let phone = if p.phone.trim().is_empty() {
                existing.phone.clone()
            } else {
                p.phone.trim().to_string()
            };
            db::students::update_parent(
                &mut *tx,
                existing.id,
                &db::students::NewParent {
                    first_name: p.first_name.trim(),
                    last_name: p.last_name.trim(),
                    email: &email,
                    phone: &phone,
                    relation_to_child: p
                        .relation_to_child
                        .as_deref()
                        .or(existing.relation_to_child.as_deref()),
                    referral_source: p
                        .referral_source
                        .as_deref()
                        .or(existing.referral_source.as_deref()),
                },
                now,
            )
            .await?;
        }
    }

    db::bookings::convert_to_membership(&mut *tx, booking.id, plan.id, req.start_date, now)
        .await?;

    // Payment runs inside the same transaction, as in membership creation
    let mut payment_status = None;
    if let Some(details) = &req.payment {
        let outcome =
            payment::attempt_payment(state, &mut *tx, booking.id, booking_ref, &plan, details)
                .await?;
        if outcome.status == PaymentStatus::Failed {
            let msg = outcome
                .message
                .unwrap_or_else(|| ErrorCode::PaymentFailed.message().to_string());
            return Err(AppError::payment_failed(msg).into());
        }
        payment_status = Some(outcome.status);
    }

    tx.commit().await?;
    tracing::info!(booking_ref, plan = %plan.name, "Converted to membership");

    Ok(ConvertedBooking {
        booking_ref: booking_ref.to_string(),
        payment_status,
    })
}

// ──────────────────────────── student updates ────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct StudentUpdate {
    pub student_id: i64,
    #[serde(flatten)]
    pub fields: StudentInput,
}

/// Update student rows on an existing booking. Each row must belong to the
/// booking; ids from other bookings are rejected.
pub async fn update_booking_students(
    state: &AppState,
    booking_ref: &str,
    updates: Vec<StudentUpdate>,
) -> ServiceResult<()> {
    if updates.is_empty() {
        return Err(AppError::validation("At least one student is required.").into());
    }

    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    let booking = load_booking(&mut *tx, booking_ref).await?;
    let students = db::students::list_for_booking(&mut *tx, booking.id).await?;

    for u in &updates {
        let existing = students
            .iter()
            .find(|s| s.id == u.student_id)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::StudentNotFound,
                    format!(
                        "Student {} not found on booking {}.",
                        u.student_id, booking_ref
                    ),
                )
            })?;
        let s = &u.fields;
        if s.first_name.trim().is_empty() {
            return Err(AppError::missing_field("Student first name").into());
        }
        if s.last_name.trim().is_empty() {
            return Err(AppError::missing_field("Student last name").into());
        }
        db::students::update_student(
            &mut *tx,
            existing.id,
            &db::students::NewStudent {
                first_name: s.first_name.trim(),
                last_name: s.last_name.trim(),
                date_of_birth: s.date_of_birth.unwrap_or(existing.date_of_birth),
                age: s.age.or(existing.age),
                gender: s.gender.as_deref().or(existing.gender.as_deref()),
                medical_info: s
                    .medical_info
                    .as_deref()
                    .unwrap_or(&existing.medical_info),
            },
            now,
        )
        .await?;
    }

    tx.commit().await?;
    tracing::info!(booking_ref, count = updates.len(), "Booking students updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_reactivate_on() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(
            compute_reactivate_on(start, 2),
            NaiveDate::from_ymd_opt(2026, 5, 15).unwrap()
        );
    }

    #[test]
    fn test_compute_reactivate_on_clamps_month_end() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(
            compute_reactivate_on(start, 1),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_compute_reactivate_on_year_rollover() {
        let start = NaiveDate::from_ymd_opt(2026, 11, 10).unwrap();
        assert_eq!(
            compute_reactivate_on(start, 3),
            NaiveDate::from_ymd_opt(2027, 2, 10).unwrap()
        );
    }

    #[test]
    fn test_guard_transition_messages() {
        let err = guard_transition(BookingStatus::Frozen, BookingStatus::Cancelled).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(
            err.message,
            "Booking cannot move from 'frozen' to 'cancelled'."
        );
        assert!(guard_transition(BookingStatus::Frozen, BookingStatus::Active).is_ok());
    }
}
