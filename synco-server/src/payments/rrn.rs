//! Bank-debit billing-request gateway

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::json;

use super::{PaymentOutcome, failure_message, map_rrn_status};

/// Client for the billing-request API (bearer-token authenticated)
#[derive(Clone)]
pub struct RrnGateway {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    currency: String,
}

impl RrnGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        access_token: &str,
        currency: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            currency: currency.to_string(),
        }
    }

    /// Create a billing request for one membership charge.
    ///
    /// Transport and decode errors never escape: they come back as a
    /// `failed` outcome carrying the error text, so the caller's status
    /// handling stays uniform.
    pub async fn create_billing_request(
        &self,
        amount: Decimal,
        description: &str,
        booking_ref: &str,
        payer_email: Option<&str>,
    ) -> PaymentOutcome {
        let amount_minor = (amount * Decimal::from(100)).round().to_i64().unwrap_or(0);
        let body = json!({
            "billing_requests": {
                "payment_request": {
                    "amount": amount_minor,
                    "currency": self.currency,
                    "description": description,
                    "metadata": { "booking_ref": booking_ref }
                },
                "mandate_request": {
                    "currency": self.currency,
                    "scheme": "bacs",
                    "metadata": { "booking_ref": booking_ref, "payer_email": payer_email }
                }
            }
        });

        let resp = match self
            .client
            .post(format!("{}/billing_requests", self.base_url))
            .bearer_auth(&self.access_token)
            .header("GoCardless-Version", "2015-07-06")
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return PaymentOutcome::transport_failure(e.to_string()),
        };

        let payload: serde_json::Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => return PaymentOutcome::transport_failure(e.to_string()),
        };

        let raw_status = payload
            .pointer("/billing_requests/status")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let status = map_rrn_status(&raw_status);
        let message = (status == shared::models::PaymentStatus::Failed)
            .then(|| failure_message(&payload));

        PaymentOutcome {
            status,
            raw_status,
            gateway_response: payload,
            message,
        }
    }
}
