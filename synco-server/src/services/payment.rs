//! Payment attempt and retry
//!
//! Exactly one gateway call per attempt. Creation inserts a fresh
//! `booking_payments` row; retry updates the latest row in place. The raw
//! gateway payload is persisted either way.

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use shared::error::{AppError, ErrorCode};
use shared::models::{PaymentMethod, PaymentStatus};
use shared::util::now_millis;

use crate::db;
use crate::db::payment_plans::PaymentPlan;
use crate::error::{ServiceError, ServiceResult};
use crate::payments::{CardDetails, PaymentOutcome};
use crate::state::AppState;

/// Payment details submitted with a membership creation or retry
#[derive(Debug, serde::Deserialize)]
pub struct PaymentDetailsInput {
    pub method: PaymentMethod,
    pub payer_first_name: Option<String>,
    pub payer_last_name: Option<String>,
    pub payer_email: Option<String>,
    pub card: Option<CardDetails>,
}

/// Card payments need card details; bank-debit payments need a payer email
pub fn validate_payment_details(details: &PaymentDetailsInput) -> Result<(), AppError> {
    match details.method {
        PaymentMethod::Card if details.card.is_none() => {
            Err(AppError::missing_field("Card details"))
        }
        PaymentMethod::Rrn
            if details
                .payer_email
                .as_deref()
                .is_none_or(|e| e.trim().is_empty()) =>
        {
            Err(AppError::missing_field("Payer email"))
        }
        _ => Ok(()),
    }
}

/// Issue one gateway call for `plan.price` and record the attempt inside the
/// caller's transaction. The caller decides whether a failed outcome aborts
/// (membership creation) or commits (standalone retry).
pub async fn attempt_payment(
    state: &AppState,
    conn: &mut PgConnection,
    booking_id: i64,
    booking_ref: &str,
    plan: &PaymentPlan,
    details: &PaymentDetailsInput,
) -> ServiceResult<PaymentOutcome> {
    validate_payment_details(details).map_err(ServiceError::App)?;

    let amount = plan.price;
    let description = format!("Synco membership - {}", plan.name);
    let outcome = call_gateway(state, amount, booking_ref, &description, details).await;

    let now = now_millis();
    let (card_holder, card_last4, card_expiry) = match &details.card {
        Some(c) => (
            Some(c.card_holder_name.clone()),
            Some(c.last4()),
            Some(c.expiry_date.clone()),
        ),
        None => (None, None, None),
    };

    db::payments::insert(
        conn,
        &db::payments::NewPaymentAttempt {
            booking_id,
            attempt_id: Uuid::new_v4(),
            payment_plan_id: Some(plan.id),
            payer_first_name: details.payer_first_name.as_deref(),
            payer_last_name: details.payer_last_name.as_deref(),
            payer_email: details.payer_email.as_deref(),
            card_holder_name: card_holder.as_deref(),
            card_last4: card_last4.as_deref(),
            card_expiry: card_expiry.as_deref(),
            payment_type: details.method.as_db(),
            payment_status: outcome.status.as_db(),
            amount,
            gateway_response: Some(&outcome.gateway_response),
            normalized_status: Some(&outcome.raw_status),
            now,
        },
    )
    .await?;

    Ok(outcome)
}

async fn call_gateway(
    state: &AppState,
    amount: Decimal,
    booking_ref: &str,
    description: &str,
    details: &PaymentDetailsInput,
) -> PaymentOutcome {
    match details.method {
        PaymentMethod::Rrn => {
            state
                .rrn
                .create_billing_request(
                    amount,
                    description,
                    booking_ref,
                    details.payer_email.as_deref(),
                )
                .await
        }
        PaymentMethod::Card => {
            let Some(card) = details.card.as_ref() else {
                return PaymentOutcome::transport_failure("Card details missing".to_string());
            };
            state.card.charge(amount, booking_ref, description, card).await
        }
    }
}

/// Outcome of a standalone retry
#[derive(Debug, serde::Serialize)]
pub struct RetryOutcome {
    pub booking_ref: String,
    pub payment_status: PaymentStatus,
    /// True when the latest attempt was already paid and no gateway call was
    /// made
    pub already_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Retry the latest payment attempt for a booking.
///
/// Idempotent with respect to success: if the latest row is already `paid`
/// the gateway is not called again. A failed retry is recorded and committed;
/// it does not roll anything back.
pub async fn retry_payment(
    state: &AppState,
    booking_ref: &str,
    details: Option<PaymentDetailsInput>,
) -> ServiceResult<RetryOutcome> {
    let mut tx = state.pool.begin().await?;

    let booking = db::bookings::find_by_ref(&mut *tx, booking_ref)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;

    let latest = db::payments::latest_for_booking(&mut *tx, booking.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PaymentNotFound))?;

    if latest.payment_status == PaymentStatus::Paid.as_db() {
        tx.commit().await?;
        tracing::info!(booking_ref, "Retry skipped, latest payment already paid");
        return Ok(RetryOutcome {
            booking_ref: booking_ref.to_string(),
            payment_status: PaymentStatus::Paid,
            already_paid: true,
            message: None,
        });
    }

    let plan_id = latest
        .payment_plan_id
        .or(booking.payment_plan_id)
        .ok_or_else(|| AppError::new(ErrorCode::PaymentPlanRequired))?;
    let plan = db::payment_plans::find_by_id(&mut *tx, plan_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PaymentPlanNotFound))?;

    // Fall back to the recorded method when no fresh details are supplied;
    // card retries must resubmit card details.
    let details = match details {
        Some(d) => d,
        None => {
            let method = PaymentMethod::from_db(&latest.payment_type)
                .ok_or_else(|| AppError::internal("Unknown payment type on record"))?;
            PaymentDetailsInput {
                method,
                payer_first_name: latest.payer_first_name.clone(),
                payer_last_name: latest.payer_last_name.clone(),
                payer_email: latest.payer_email.clone(),
                card: None,
            }
        }
    };
    validate_payment_details(&details).map_err(ServiceError::App)?;

    let description = format!("Synco membership - {}", plan.name);
    let outcome = call_gateway(state, plan.price, booking_ref, &description, &details).await;

    db::payments::update_outcome(
        &mut *tx,
        latest.id,
        outcome.status.as_db(),
        &outcome.raw_status,
        &outcome.gateway_response,
        now_millis(),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        booking_ref,
        status = outcome.status.as_db(),
        "Payment retry recorded"
    );

    Ok(RetryOutcome {
        booking_ref: booking_ref.to_string(),
        payment_status: outcome.status,
        already_paid: false,
        message: outcome.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_input(card: Option<CardDetails>) -> PaymentDetailsInput {
        PaymentDetailsInput {
            method: PaymentMethod::Card,
            payer_first_name: Some("Jordan".into()),
            payer_last_name: Some("Lee".into()),
            payer_email: Some("jordan@example.com".into()),
            card,
        }
    }

    #[test]
    fn test_card_requires_card_details() {
        let err = validate_payment_details(&card_input(None)).unwrap_err();
        assert_eq!(err.message, "Card details is required.");
    }

    #[test]
    fn test_card_with_details_ok() {
        let input = card_input(Some(CardDetails {
            pan: "4111111111111111".into(),
            expiry_date: "1227".into(),
            card_holder_name: "Jordan Lee".into(),
            cv2: "123".into(),
        }));
        assert!(validate_payment_details(&input).is_ok());
    }

    #[test]
    fn test_rrn_requires_payer_email() {
        let input = PaymentDetailsInput {
            method: PaymentMethod::Rrn,
            payer_first_name: None,
            payer_last_name: None,
            payer_email: Some("  ".into()),
            card: None,
        };
        let err = validate_payment_details(&input).unwrap_err();
        assert_eq!(err.message, "Payer email is required.");
    }

    #[test]
    fn test_rrn_with_email_ok() {
        let input = PaymentDetailsInput {
            method: PaymentMethod::Rrn,
            payer_first_name: None,
            payer_last_name: None,
            payer_email: Some("jordan@example.com".into()),
            card: None,
        };
        assert!(validate_payment_details(&input).is_ok());
    }
}
