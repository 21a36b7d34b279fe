//! Card charge gateway

use rust_decimal::Decimal;
use serde_json::json;

use super::{PaymentOutcome, failure_message, map_card_status};

/// Card details as submitted by the payer; only masked fragments are ever
/// persisted.
#[derive(Debug, serde::Deserialize)]
pub struct CardDetails {
    pub pan: String,
    /// MMYY
    pub expiry_date: String,
    pub card_holder_name: String,
    pub cv2: String,
}

impl CardDetails {
    /// Last four digits, the only part of the PAN that is stored
    pub fn last4(&self) -> String {
        let digits: String = self.pan.chars().filter(|c| c.is_ascii_digit()).collect();
        let n = digits.len();
        digits[n.saturating_sub(4)..].to_string()
    }
}

/// Client for the card charge API (basic-auth against a per-installation
/// endpoint)
#[derive(Clone)]
pub struct CardGateway {
    client: reqwest::Client,
    base_url: String,
    inst_id: String,
    username: String,
    password: String,
    currency: String,
}

impl CardGateway {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        inst_id: &str,
        username: &str,
        password: &str,
        currency: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            inst_id: inst_id.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            currency: currency.to_string(),
        }
    }

    /// Charge a card once. Transport and decode errors come back as a
    /// `failed` outcome, never as an Err.
    pub async fn charge(
        &self,
        amount: Decimal,
        merchant_ref: &str,
        description: &str,
        card: &CardDetails,
    ) -> PaymentOutcome {
        let body = json!({
            "transaction": {
                "currency": self.currency,
                "amount": amount,
                "merchantRef": merchant_ref,
                "description": description,
                "commerceType": "ECOM"
            },
            "paymentMethod": {
                "card": {
                    "pan": card.pan,
                    "expiryDate": card.expiry_date,
                    "cardHolderName": card.card_holder_name,
                    "cv2": card.cv2
                }
            }
        });

        let resp = match self
            .client
            .post(format!(
                "{}/transactions/{}/payment",
                self.base_url, self.inst_id
            ))
            .basic_auth(&self.username, Some(&self.password))
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
            .pointer("/transaction/status")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let status = map_card_status(&raw_status);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_last4() {
        let card = CardDetails {
            pan: "4111 1111 1111 1234".into(),
            expiry_date: "1227".into(),
            card_holder_name: "A Parent".into(),
            cv2: "123".into(),
        };
        assert_eq!(card.last4(), "1234");
    }

    #[test]
    fn test_card_last4_short_pan() {
        let card = CardDetails {
            pan: "99".into(),
            expiry_date: "1227".into(),
            card_holder_name: "A Parent".into(),
            cv2: "123".into(),
        };
        assert_eq!(card.last4(), "99");
    }
}
