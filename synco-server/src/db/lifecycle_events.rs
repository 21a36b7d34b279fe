//! Tagged booking lifecycle events
//!
//! One upserted row per (booking, kind); kind-specific fields live in the
//! JSONB payload, scheduled-cancellation dates get a real column so the
//! due-cancellations query stays indexable.

use chrono::NaiveDate;
use sqlx::PgConnection;

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct LifecycleEvent {
    pub id: i64,
    pub booking_id: i64,
    pub kind: String,
    pub cancellation_type: Option<String>,
    pub cancel_date: Option<NaiveDate>,
    pub payload: serde_json::Value,
    pub created_at: i64,
}

pub struct NewLifecycleEvent<'a> {
    pub booking_id: i64,
    pub kind: &'a str,
    pub cancellation_type: Option<&'a str>,
    pub cancel_date: Option<NaiveDate>,
    pub payload: serde_json::Value,
    pub now: i64,
}

pub async fn upsert(
    conn: &mut PgConnection,
    e: &NewLifecycleEvent<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO booking_lifecycle_events
            (booking_id, kind, cancellation_type, cancel_date, payload, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         ON CONFLICT (booking_id, kind) DO UPDATE SET
            cancellation_type = EXCLUDED.cancellation_type,
            cancel_date = EXCLUDED.cancel_date,
            payload = EXCLUDED.payload,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(e.booking_id)
    .bind(e.kind)
    .bind(e.cancellation_type)
    .bind(e.cancel_date)
    .bind(&e.payload)
    .bind(e.now)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_for_booking(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<Vec<LifecycleEvent>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, booking_id, kind, cancellation_type, cancel_date, payload, created_at
         FROM booking_lifecycle_events
         WHERE booking_id = $1
         ORDER BY created_at",
    )
    .bind(booking_id)
    .fetch_all(conn)
    .await
}
