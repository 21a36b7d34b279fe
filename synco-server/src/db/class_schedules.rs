//! Class schedules and capacity accounting

use sqlx::{PgConnection, PgPool};

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct ClassSchedule {
    pub id: i64,
    pub venue_id: i64,
    pub class_name: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i32,
}

pub async fn find_by_id(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<ClassSchedule>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, venue_id, class_name, day_of_week, start_time, end_time, capacity
         FROM class_schedules WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Atomic conditional capacity decrement.
///
/// `capacity >= $n` in the predicate makes the affected-row count the success
/// signal: zero rows means another request won the remaining slots and the
/// caller must fail the booking. Never read-then-write capacity.
pub async fn try_decrement_capacity(
    conn: &mut PgConnection,
    id: i64,
    n: i32,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE class_schedules
         SET capacity = capacity - $1, updated_at = $2
         WHERE id = $3 AND capacity >= $1",
    )
    .bind(n)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Administrative capacity override. Capacity is never restored
/// automatically on cancellation; this is the manual operation.
pub async fn set_capacity(
    conn: &mut PgConnection,
    id: i64,
    capacity: i32,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE class_schedules SET capacity = $1, updated_at = $2 WHERE id = $3",
    )
    .bind(capacity)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list(pool: &PgPool) -> Result<Vec<ClassSchedule>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, venue_id, class_name, day_of_week, start_time, end_time, capacity
         FROM class_schedules ORDER BY venue_id, day_of_week, start_time",
    )
    .fetch_all(pool)
    .await
}
