//! Payment attempt history
//!
//! Every attempt (including retries) is preserved; the most recent row by
//! `created_at` is the booking's payment truth.

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct PaymentAttempt {
    pub id: i64,
    pub booking_id: i64,
    pub attempt_id: Uuid,
    pub payment_plan_id: Option<i64>,
    pub payer_first_name: Option<String>,
    pub payer_last_name: Option<String>,
    pub payer_email: Option<String>,
    pub payment_type: String,
    pub payment_status: String,
    pub amount: Decimal,
    pub gateway_response: Option<serde_json::Value>,
    pub normalized_status: Option<String>,
    pub created_at: i64,
}

pub struct NewPaymentAttempt<'a> {
    pub booking_id: i64,
    pub attempt_id: Uuid,
    pub payment_plan_id: Option<i64>,
    pub payer_first_name: Option<&'a str>,
    pub payer_last_name: Option<&'a str>,
    pub payer_email: Option<&'a str>,
    pub card_holder_name: Option<&'a str>,
    pub card_last4: Option<&'a str>,
    pub card_expiry: Option<&'a str>,
    pub payment_type: &'a str,
    pub payment_status: &'a str,
    pub amount: Decimal,
    pub gateway_response: Option<&'a serde_json::Value>,
    pub normalized_status: Option<&'a str>,
    pub now: i64,
}

pub async fn insert(
    conn: &mut PgConnection,
    p: &NewPaymentAttempt<'_>,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO booking_payments (
            booking_id, attempt_id, payment_plan_id, payer_first_name, payer_last_name,
            payer_email, card_holder_name, card_last4, card_expiry, payment_type,
            payment_status, amount, gateway_response, normalized_status, created_at, updated_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
         RETURNING id",
    )
    .bind(p.booking_id)
    .bind(p.attempt_id)
    .bind(p.payment_plan_id)
    .bind(p.payer_first_name)
    .bind(p.payer_last_name)
    .bind(p.payer_email)
    .bind(p.card_holder_name)
    .bind(p.card_last4)
    .bind(p.card_expiry)
    .bind(p.payment_type)
    .bind(p.payment_status)
    .bind(p.amount)
    .bind(p.gateway_response)
    .bind(p.normalized_status)
    .bind(p.now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn latest_for_booking(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<Option<PaymentAttempt>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, booking_id, attempt_id, payment_plan_id, payer_first_name, payer_last_name,
                payer_email, payment_type, payment_status, amount, gateway_response,
                normalized_status, created_at
         FROM booking_payments
         WHERE booking_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT 1",
    )
    .bind(booking_id)
    .fetch_optional(conn)
    .await
}

/// Retry flow: the latest attempt row is updated in place with the new
/// gateway outcome rather than appending a fresh row.
pub async fn update_outcome(
    conn: &mut PgConnection,
    payment_id: i64,
    payment_status: &str,
    normalized_status: &str,
    gateway_response: &serde_json::Value,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE booking_payments
         SET payment_status = $1, normalized_status = $2, gateway_response = $3, updated_at = $4
         WHERE id = $5",
    )
    .bind(payment_status)
    .bind(normalized_status)
    .bind(gateway_response)
    .bind(now)
    .bind(payment_id)
    .execute(conn)
    .await?;
    Ok(())
}
