//! Membership payment plans

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct PaymentPlan {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub joining_fee: Decimal,
    pub duration_months: i32,
    pub billing_interval: String,
}

pub async fn find_by_id(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<PaymentPlan>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, price, joining_fee, duration_months, billing_interval
         FROM payment_plans WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<PaymentPlan>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, price, joining_fee, duration_months, billing_interval
         FROM payment_plans ORDER BY price",
    )
    .fetch_all(pool)
    .await
}
