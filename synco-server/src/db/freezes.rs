//! Membership freeze periods

use chrono::NaiveDate;
use sqlx::PgConnection;

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct Freeze {
    pub id: i64,
    pub booking_id: i64,
    pub freeze_start: NaiveDate,
    pub duration_months: i32,
    pub reactivate_on: NaiveDate,
    pub reason: Option<String>,
}

/// The freeze that is still in effect, if any (`reactivate_on` not yet reached)
pub async fn active_for_booking(
    conn: &mut PgConnection,
    booking_id: i64,
    today: NaiveDate,
) -> Result<Option<Freeze>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, booking_id, freeze_start, duration_months, reactivate_on, reason
         FROM booking_freezes
         WHERE booking_id = $1 AND reactivate_on > $2
         ORDER BY reactivate_on DESC
         LIMIT 1",
    )
    .bind(booking_id)
    .bind(today)
    .fetch_optional(conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    booking_id: i64,
    freeze_start: NaiveDate,
    duration_months: i32,
    reactivate_on: NaiveDate,
    reason: Option<&str>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO booking_freezes
            (booking_id, freeze_start, duration_months, reactivate_on, reason, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         RETURNING id",
    )
    .bind(booking_id)
    .bind(freeze_start)
    .bind(duration_months)
    .bind(reactivate_on)
    .bind(reason)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Reactivation removes the freeze rows outright
pub async fn delete_for_booking(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM booking_freezes WHERE booking_id = $1")
        .bind(booking_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
