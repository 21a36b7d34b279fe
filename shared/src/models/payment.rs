//! Payment method and status enums

use serde::{Deserialize, Serialize};

/// How a payment attempt is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Bank-debit billing request
    Rrn,
    /// Card charge
    Card,
}

impl PaymentMethod {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "rrn" => Some(Self::Rrn),
            "card" => Some(Self::Card),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Rrn => "rrn",
            Self::Card => "card",
        }
    }
}

/// Normalized outcome of a payment attempt
///
/// The latest attempt row carries the booking's payment truth; gateway raw
/// statuses are reconciled into exactly these three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_roundtrip() {
        assert_eq!(PaymentMethod::from_db("rrn"), Some(PaymentMethod::Rrn));
        assert_eq!(PaymentMethod::from_db("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::from_db("cheque"), None);
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
        ] {
            assert_eq!(PaymentStatus::from_db(s.as_db()), Some(s));
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Rrn).unwrap(),
            "\"rrn\""
        );
    }
}
