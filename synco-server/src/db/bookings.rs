//! Booking aggregate rows

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub booking_ref: String,
    pub booking_type: String,
    pub status: String,
    pub total_students: i32,
    pub trial_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub interest: Option<String>,
    pub additional_note: Option<String>,
    pub reason_for_non_attendance: Option<String>,
    pub venue_id: i64,
    pub class_schedule_id: i64,
    pub payment_plan_id: Option<i64>,
    pub booked_by: i64,
    pub created_at: i64,
}

const BOOKING_COLUMNS: &str = "id, booking_ref, booking_type, status, total_students, trial_date, \
     start_date, interest, additional_note, reason_for_non_attendance, venue_id, \
     class_schedule_id, payment_plan_id, booked_by, created_at";

pub struct NewBooking<'a> {
    pub booking_ref: &'a str,
    pub booking_type: &'a str,
    pub status: &'a str,
    pub total_students: i32,
    pub trial_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub interest: Option<&'a str>,
    pub additional_note: Option<&'a str>,
    pub venue_id: i64,
    pub class_schedule_id: i64,
    pub payment_plan_id: Option<i64>,
    pub booked_by: i64,
    pub now: i64,
}

pub async fn insert(conn: &mut PgConnection, b: &NewBooking<'_>) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO bookings (
            booking_ref, booking_type, status, total_students, trial_date, start_date,
            interest, additional_note, venue_id, class_schedule_id, payment_plan_id,
            booked_by, created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
         RETURNING id",
    )
    .bind(b.booking_ref)
    .bind(b.booking_type)
    .bind(b.status)
    .bind(b.total_students)
    .bind(b.trial_date)
    .bind(b.start_date)
    .bind(b.interest)
    .bind(b.additional_note)
    .bind(b.venue_id)
    .bind(b.class_schedule_id)
    .bind(b.payment_plan_id)
    .bind(b.booked_by)
    .bind(b.now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn find_by_ref(
    conn: &mut PgConnection,
    booking_ref: &str,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_ref = $1"
    ))
    .bind(booking_ref)
    .fetch_optional(conn)
    .await
}

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn update_status(
    conn: &mut PgConnection,
    id: i64,
    status: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_status_and_type(
    conn: &mut PgConnection,
    id: i64,
    status: &str,
    booking_type: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE bookings SET status = $1, booking_type = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(status)
    .bind(booking_type)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Record a trial outcome (attended / not attend / rebooked)
pub async fn update_trial_outcome(
    conn: &mut PgConnection,
    id: i64,
    status: &str,
    reason_for_non_attendance: Option<&str>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE bookings
         SET status = $1, reason_for_non_attendance = COALESCE($2, reason_for_non_attendance),
             updated_at = $3
         WHERE id = $4",
    )
    .bind(status)
    .bind(reason_for_non_attendance)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Re-point a booking at a different class (and its venue). Capacity on both
/// classes is intentionally left untouched.
pub async fn transfer_class(
    conn: &mut PgConnection,
    id: i64,
    class_schedule_id: i64,
    venue_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE bookings SET class_schedule_id = $1, venue_id = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(class_schedule_id)
    .bind(venue_id)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Waiting-list conversion: clear the trial date, attach the plan, flip to a
/// paid active membership.
pub async fn convert_to_membership(
    conn: &mut PgConnection,
    id: i64,
    payment_plan_id: i64,
    start_date: NaiveDate,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE bookings
         SET booking_type = 'paid', status = 'active', trial_date = NULL,
             payment_plan_id = $1, start_date = $2, updated_at = $3
         WHERE id = $4",
    )
    .bind(payment_plan_id)
    .bind(start_date)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct DueCancellation {
    pub id: i64,
    pub booking_ref: String,
    pub status: String,
    pub cancel_date: Option<NaiveDate>,
}

/// Scheduled cancellations whose date has arrived.
///
/// The flip to `cancelled` is operator/cron driven; this query is the
/// scheduler-agnostic surface for it.
pub async fn due_cancellations(
    pool: &PgPool,
    as_of: NaiveDate,
) -> Result<Vec<DueCancellation>, sqlx::Error> {
    sqlx::query_as(
        "SELECT b.id, b.booking_ref, b.status, e.cancel_date
         FROM bookings b
         JOIN booking_lifecycle_events e ON e.booking_id = b.id AND e.kind = 'cancelled'
         WHERE b.status = 'request_to_cancel'
           AND e.cancellation_type = 'scheduled'
           AND e.cancel_date <= $1
         ORDER BY e.cancel_date",
    )
    .bind(as_of)
    .fetch_all(pool)
    .await
}
