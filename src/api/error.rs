//! Structured API error responses with error codes
//!
//! Callers receive a stable machine-readable code plus a human-readable
//! message. Backing-store failures surface as a generic dependency
//! failure and never leak store-specific error text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::infra::CoreError;

/// Error codes for API responses
///
/// These codes are stable and can be used by clients for programmatic
/// error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication errors (1xxx)
    /// No authentication credentials provided
    AuthRequired,
    /// Invalid or expired token
    InvalidToken,
    /// Wrong username or password
    InvalidCredentials,
    /// Role check failed
    InsufficientPermissions,

    // Rate limiting (2xxx)
    /// Too many requests
    RateLimitExceeded,

    // Validation errors (3xxx)
    /// Request body is malformed
    InvalidRequestBody,
    /// Field value is invalid
    InvalidFieldValue,
    /// Uploaded media type is not accepted
    UnsupportedMediaType,
    /// Unknown voucher id
    InvalidVoucher,

    // Resource errors (4xxx)
    /// Requested resource not found (or not owned by the caller)
    ResourceNotFound,

    // Conflict errors (5xxx)
    /// Duplicate pending submission or duplicate username
    Conflict,
    /// Record exists but is not eligible for the operation
    NotEligible,

    // Economy errors (6xxx)
    /// Guarded debit rejected
    InsufficientPoints,

    // Infrastructure errors (8xxx)
    /// Backing store or artifact store unavailable; retryable
    DependencyFailure,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn numeric_code(&self) -> u32 {
        match self {
            ErrorCode::AuthRequired => 1001,
            ErrorCode::InvalidToken => 1002,
            ErrorCode::InvalidCredentials => 1003,
            ErrorCode::InsufficientPermissions => 1004,

            ErrorCode::RateLimitExceeded => 2001,

            ErrorCode::InvalidRequestBody => 3001,
            ErrorCode::InvalidFieldValue => 3002,
            ErrorCode::UnsupportedMediaType => 3003,
            ErrorCode::InvalidVoucher => 3004,

            ErrorCode::ResourceNotFound => 4001,

            ErrorCode::Conflict => 5001,
            ErrorCode::NotEligible => 5002,

            ErrorCode::InsufficientPoints => 6001,

            ErrorCode::DependencyFailure => 8001,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::AuthRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::InsufficientPermissions => StatusCode::FORBIDDEN,

            ErrorCode::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,

            ErrorCode::InvalidRequestBody => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
            ErrorCode::UnsupportedMediaType => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidVoucher => StatusCode::BAD_REQUEST,

            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,

            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::NotEligible => StatusCode::FORBIDDEN,

            ErrorCode::InsufficientPoints => StatusCode::BAD_REQUEST,

            ErrorCode::DependencyFailure => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::AuthRequired => "AUTH_REQUIRED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ErrorCode::InvalidVoucher => "INVALID_VOUCHER",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::NotEligible => "NOT_ELIGIBLE",
            ErrorCode::InsufficientPoints => "INSUFFICIENT_POINTS",
            ErrorCode::DependencyFailure => "DEPENDENCY_FAILURE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code_str)
    }
}

/// Structured error response for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ErrorDetails,
}

/// Detailed error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Numeric error code for easy categorization
    pub numeric_code: u32,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code,
                numeric_code: code.numeric_code(),
                message: message.into(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.error.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code_str = self.error.code.to_string();
        let mut response = (status, Json(self)).into_response();

        if let Ok(code_value) = axum::http::HeaderValue::from_str(&code_str) {
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-error-code"),
                code_value,
            );
        }

        response
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ApiError::new(ErrorCode::InvalidFieldValue, msg),
            CoreError::Conflict(msg) => ApiError::new(ErrorCode::Conflict, msg),
            CoreError::NotFound(resource) => ApiError::new(
                ErrorCode::ResourceNotFound,
                format!("{resource} not found"),
            ),
            CoreError::Forbidden(msg) => ApiError::new(ErrorCode::NotEligible, msg),
            CoreError::InsufficientBalance => {
                ApiError::new(ErrorCode::InsufficientPoints, "insufficient points")
            }
            CoreError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                ApiError::new(ErrorCode::DependencyFailure, "backing store unavailable")
            }
            CoreError::Artifact(e) => {
                tracing::error!(error = %e, "artifact store failure");
                ApiError::new(ErrorCode::DependencyFailure, "artifact store unavailable")
            }
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                ApiError::new(ErrorCode::InternalError, "internal error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth => {
                ApiError::new(ErrorCode::AuthRequired, "missing authentication")
            }
            AuthError::InvalidToken(_) => ApiError::new(ErrorCode::InvalidToken, "invalid token"),
            AuthError::TokenExpired => ApiError::new(ErrorCode::InvalidToken, "token expired"),
            AuthError::InvalidCredentials => {
                ApiError::new(ErrorCode::InvalidCredentials, "invalid credentials")
            }
            AuthError::InsufficientPermissions => ApiError::new(
                ErrorCode::InsufficientPermissions,
                "authority role required",
            ),
            AuthError::RateLimited => {
                ApiError::new(ErrorCode::RateLimitExceeded, "rate limit exceeded")
            }
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "auth internal error");
                ApiError::new(ErrorCode::InternalError, "internal error")
            }
        }
    }
}

/// Create a validation error for a malformed request body.
pub fn invalid_body(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidRequestBody, message)
}
