//! Database access layer
//!
//! One module per table. Functions that participate in a unit of work take
//! `&mut PgConnection` so they run against either the pool or a transaction.

pub mod accounts;
pub mod audit;
pub mod booking_queries;
pub mod bookings;
pub mod class_schedules;
pub mod freezes;
pub mod lifecycle_events;
pub mod payment_plans;
pub mod payments;
pub mod students;
pub mod venues;

/// Postgres unique-constraint violation (SQLSTATE 23505)
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .is_some_and(|c| c == "23505")
}
