//! Payment gateway integrations via REST API (no SDK dependency)
//!
//! Two gateways, one outcome shape: the bank-debit billing-request API and
//! the card charge API both reduce to a [`PaymentOutcome`] carrying the raw
//! payload (persisted for audit) and the normalized status.

mod card;
mod rrn;

pub use card::{CardDetails, CardGateway};
pub use rrn::RrnGateway;

use shared::models::PaymentStatus;

/// Uniform result of exactly one gateway call
#[derive(Debug)]
pub struct PaymentOutcome {
    /// Normalized payment status
    pub status: PaymentStatus,
    /// The gateway's raw status string
    pub raw_status: String,
    /// Full raw payload from the gateway, never discarded
    pub gateway_response: serde_json::Value,
    /// Failure detail when `status` is `Failed`
    pub message: Option<String>,
}

impl PaymentOutcome {
    /// Network/HTTP-level failure before any status was returned
    pub fn transport_failure(message: String) -> Self {
        Self {
            status: PaymentStatus::Failed,
            raw_status: "error".to_string(),
            gateway_response: serde_json::json!({ "error": { "message": message.clone() } }),
            message: Some(message),
        }
    }
}

/// Normalize a bank-debit billing-request status
pub fn map_rrn_status(raw: &str) -> PaymentStatus {
    match raw.to_ascii_lowercase().as_str() {
        "submitted" | "pending_submission" | "pending" => PaymentStatus::Pending,
        "confirmed" | "paid" => PaymentStatus::Paid,
        _ => PaymentStatus::Failed,
    }
}

/// Normalize a card transaction status
pub fn map_card_status(raw: &str) -> PaymentStatus {
    match raw.to_ascii_lowercase().as_str() {
        "success" | "already_paid" => PaymentStatus::Paid,
        "pending" => PaymentStatus::Pending,
        _ => PaymentStatus::Failed,
    }
}

/// Pull the most useful failure message out of a gateway payload:
/// a `reasonMessage` (top-level or under `transaction`), then
/// `error.message`, then the stringified body.
pub fn failure_message(body: &serde_json::Value) -> String {
    if let Some(m) = body.get("reasonMessage").and_then(|v| v.as_str()) {
        return m.to_string();
    }
    if let Some(m) = body
        .pointer("/transaction/reasonMessage")
        .and_then(|v| v.as_str())
    {
        return m.to_string();
    }
    if let Some(m) = body.pointer("/error/message").and_then(|v| v.as_str()) {
        return m.to_string();
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rrn_status_mapping() {
        assert_eq!(map_rrn_status("submitted"), PaymentStatus::Pending);
        assert_eq!(map_rrn_status("pending_submission"), PaymentStatus::Pending);
        assert_eq!(map_rrn_status("pending"), PaymentStatus::Pending);
        assert_eq!(map_rrn_status("confirmed"), PaymentStatus::Paid);
        assert_eq!(map_rrn_status("paid"), PaymentStatus::Paid);
        assert_eq!(map_rrn_status("failed"), PaymentStatus::Failed);
        assert_eq!(map_rrn_status("cancelled"), PaymentStatus::Failed);
        assert_eq!(map_rrn_status("some_new_state"), PaymentStatus::Failed);
        assert_eq!(map_rrn_status(""), PaymentStatus::Failed);
    }

    #[test]
    fn test_card_status_mapping() {
        assert_eq!(map_card_status("success"), PaymentStatus::Paid);
        assert_eq!(map_card_status("already_paid"), PaymentStatus::Paid);
        assert_eq!(map_card_status("pending"), PaymentStatus::Pending);
        assert_eq!(map_card_status("declined"), PaymentStatus::Failed);
        assert_eq!(map_card_status("voided"), PaymentStatus::Failed);
        assert_eq!(map_card_status(""), PaymentStatus::Failed);
    }

    #[test]
    fn test_status_mapping_is_case_insensitive() {
        assert_eq!(map_card_status("SUCCESS"), PaymentStatus::Paid);
        assert_eq!(map_rrn_status("Confirmed"), PaymentStatus::Paid);
    }

    #[test]
    fn test_failure_message_prefers_reason_message() {
        let body = json!({
            "reasonMessage": "Card declined by issuer",
            "error": { "message": "generic" }
        });
        assert_eq!(failure_message(&body), "Card declined by issuer");
    }

    #[test]
    fn test_failure_message_nested_transaction() {
        let body = json!({
            "transaction": { "status": "declined", "reasonMessage": "Insufficient funds" }
        });
        assert_eq!(failure_message(&body), "Insufficient funds");
    }

    #[test]
    fn test_failure_message_error_message() {
        let body = json!({ "error": { "message": "Invalid bank details" } });
        assert_eq!(failure_message(&body), "Invalid bank details");
    }

    #[test]
    fn test_failure_message_falls_back_to_body() {
        let body = json!({ "weird": true });
        assert_eq!(failure_message(&body), body.to_string());
    }

    #[test]
    fn test_transport_failure_shape() {
        let outcome = PaymentOutcome::transport_failure("connection refused".into());
        assert_eq!(outcome.status, PaymentStatus::Failed);
        assert_eq!(outcome.raw_status, "error");
        assert_eq!(outcome.message.as_deref(), Some("connection refused"));
        assert_eq!(
            failure_message(&outcome.gateway_response),
            "connection refused"
        );
    }
}
