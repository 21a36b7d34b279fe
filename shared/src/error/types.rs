//! Error types and API response structures

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error with structured error code
///
/// The primary error type for the Synco backend: a standardized
/// [`ErrorCode`] plus the human-readable message that ends up in the
/// API envelope.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a validation error naming a missing required field
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::with_message(
            ErrorCode::RequiredField,
            format!("{} is required.", field.into()),
        )
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
    }

    /// Create a capacity error stating the remaining slots
    pub fn capacity_exceeded(remaining: i32) -> Self {
        Self::with_message(
            ErrorCode::CapacityExceeded,
            format!("Only {} slot(s) left for this class.", remaining),
        )
    }

    /// Create a seats-available error (waiting-list gate)
    pub fn seats_available(remaining: i32) -> Self {
        Self::with_message(
            ErrorCode::SeatsAvailable,
            format!(
                "This class still has {} seat(s) available, booking can be made directly.",
                remaining
            ),
        )
    }

    /// Create a duplicate-email error
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::with_message(
            ErrorCode::DuplicateEmail,
            format!("Email {} already exists.", email.into()),
        )
    }

    /// Create a payment-failed error carrying the gateway's message
    pub fn payment_failed(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PaymentFailed, msg)
    }

    /// Create a not authenticated error
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create an invalid transition error
    pub fn invalid_transition(from: &str, to: &str) -> Self {
        Self::with_message(
            ErrorCode::InvalidTransition,
            format!("Booking cannot move from '{}' to '{}'.", from, to),
        )
    }
}

/// Unified API response structure
///
/// Every endpoint answers with the same envelope:
/// - `status`: `true` on success, `false` on failure
/// - `message`: human-readable outcome
/// - `data`: payload (present on success when there is one)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Operation outcome
    pub status: bool,
    /// Human-readable message
    pub message: String,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            status: true,
            message: "OK".to_string(),
            data: Some(data),
        }
    }

    /// Create a success response with custom message and data
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Create a success response without data
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            status: false,
            message: err.message.clone(),
            data: None,
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            status: false,
            message: err.message,
            data: None,
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();

        // Log system errors
        if matches!(self.code.category(), ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        let body = ApiResponse::<()>::error(&self);
        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = if self.status {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::BookingNotFound);
        assert_eq!(err.code, ErrorCode::BookingNotFound);
        assert_eq!(err.message, "Booking not found");
    }

    #[test]
    fn test_app_error_with_message() {
        let err = AppError::with_message(ErrorCode::ValidationFailed, "Invalid email format");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid email format");
    }

    #[test]
    fn test_capacity_exceeded_message() {
        let err = AppError::capacity_exceeded(2);
        assert_eq!(err.code, ErrorCode::CapacityExceeded);
        assert_eq!(err.message, "Only 2 slot(s) left for this class.");
    }

    #[test]
    fn test_seats_available_message() {
        let err = AppError::seats_available(1);
        assert_eq!(err.code, ErrorCode::SeatsAvailable);
        assert!(err.message.contains("1 seat(s) available"));
    }

    #[test]
    fn test_duplicate_email_message() {
        let err = AppError::duplicate_email("parent@example.com");
        assert_eq!(err.code, ErrorCode::DuplicateEmail);
        assert_eq!(err.message, "Email parent@example.com already exists.");
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_missing_field_message() {
        let err = AppError::missing_field("Student first name");
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.message, "Student first name is required.");
    }

    #[test]
    fn test_app_error_http_status() {
        assert_eq!(
            AppError::new(ErrorCode::BookingNotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::not_authenticated().http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::capacity_exceeded(3).http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::NotFound, "Booking not found");
        assert_eq!(format!("{}", err), "Booking not found");
    }

    #[test]
    fn test_api_response_success() {
        let response = ApiResponse::success(42);
        assert!(response.status);
        assert_eq!(response.message, "OK");
        assert_eq!(response.data, Some(42));
    }

    #[test]
    fn test_api_response_error() {
        let err = AppError::duplicate_email("a@b.com");
        let response = ApiResponse::<()>::error(&err);
        assert!(!response.status);
        assert_eq!(response.message, "Email a@b.com already exists.");
        assert!(response.data.is_none());
    }

    #[test]
    fn test_api_response_serialize() {
        let response = ApiResponse::success_with_message("Booking created successfully.", "hello");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":true"));
        assert!(json.contains("\"message\":\"Booking created successfully.\""));
        assert!(json.contains("\"data\":\"hello\""));
    }

    #[test]
    fn test_api_response_error_omits_data() {
        let err = AppError::new(ErrorCode::InternalError);
        let response: ApiResponse<String> = err.into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":false"));
        assert!(!json.contains("\"data\""));
    }
}
