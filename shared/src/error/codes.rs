//! Unified error codes for the Synco backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Booking errors
//! - 5xxx: Payment errors
//! - 6xxx: Class / venue errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 6,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Account ====================
    /// Account not found
    AccountNotFound = 3001,
    /// Parent email already registered (as parent meta or login account)
    DuplicateEmail = 3002,
    /// Password too short
    PasswordTooShort = 3003,

    // ==================== 4xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 4001,
    /// Class does not have enough remaining slots
    CapacityExceeded = 4002,
    /// Waiting-list entry rejected because the class still has open slots
    SeatsAvailable = 4003,
    /// Booking status transition not allowed
    InvalidTransition = 4004,
    /// Booking already has an active freeze
    AlreadyFrozen = 4005,
    /// Booking is not frozen
    NotFrozen = 4006,
    /// Student not found on booking
    StudentNotFound = 4007,
    /// Parent not found on booking
    ParentNotFound = 4008,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Payment plan required for this operation
    PaymentPlanRequired = 5002,
    /// Payment plan not found
    PaymentPlanNotFound = 5003,
    /// No payment recorded for booking
    PaymentNotFound = 5004,

    // ==================== 6xxx: Class / Venue ====================
    /// Class schedule not found
    ClassNotFound = 6001,
    /// Venue not found
    VenueNotFound = 6002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error talking to an external provider
    NetworkError = 9003,
    /// Email dispatch error
    EmailError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Account
            ErrorCode::AccountNotFound => "Account not found",
            ErrorCode::DuplicateEmail => "Email already exists",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",

            // Booking
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::CapacityExceeded => "Class does not have enough remaining slots",
            ErrorCode::SeatsAvailable => "Class still has seats available",
            ErrorCode::InvalidTransition => "Booking status transition not allowed",
            ErrorCode::AlreadyFrozen => "Booking already has an active freeze",
            ErrorCode::NotFrozen => "Booking is not frozen",
            ErrorCode::StudentNotFound => "Student not found on booking",
            ErrorCode::ParentNotFound => "Parent not found on booking",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentPlanRequired => "A payment plan is required",
            ErrorCode::PaymentPlanNotFound => "Payment plan not found",
            ErrorCode::PaymentNotFound => "No payment recorded for booking",

            // Class / Venue
            ErrorCode::ClassNotFound => "Class schedule not found",
            ErrorCode::VenueNotFound => "Venue not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "External provider error",
            ErrorCode::EmailError => "Email dispatch error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Account
            3001 => Ok(ErrorCode::AccountNotFound),
            3002 => Ok(ErrorCode::DuplicateEmail),
            3003 => Ok(ErrorCode::PasswordTooShort),

            // Booking
            4001 => Ok(ErrorCode::BookingNotFound),
            4002 => Ok(ErrorCode::CapacityExceeded),
            4003 => Ok(ErrorCode::SeatsAvailable),
            4004 => Ok(ErrorCode::InvalidTransition),
            4005 => Ok(ErrorCode::AlreadyFrozen),
            4006 => Ok(ErrorCode::NotFrozen),
            4007 => Ok(ErrorCode::StudentNotFound),
            4008 => Ok(ErrorCode::ParentNotFound),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentPlanRequired),
            5003 => Ok(ErrorCode::PaymentPlanNotFound),
            5004 => Ok(ErrorCode::PaymentNotFound),

            // Class / Venue
            6001 => Ok(ErrorCode::ClassNotFound),
            6002 => Ok(ErrorCode::VenueNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::EmailError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::DuplicateEmail.code(), 3002);
        assert_eq!(ErrorCode::CapacityExceeded.code(), 4002);
        assert_eq!(ErrorCode::PaymentFailed.code(), 5001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::DuplicateEmail,
            ErrorCode::BookingNotFound,
            ErrorCode::SeatsAvailable,
            ErrorCode::PaymentFailed,
            ErrorCode::ClassNotFound,
            ErrorCode::InternalError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serde_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::CapacityExceeded,
            ErrorCode::InternalError,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ErrorCode::SeatsAvailable.message(),
            "Class still has seats available"
        );
        assert_eq!(ErrorCode::DuplicateEmail.message(), "Email already exists");
    }
}
