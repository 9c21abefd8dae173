/// Error Handling Module
///
/// One error taxonomy for the whole service:
/// 1. Domain errors (validation, store, token) raised by the core
/// 2. `AuthError`, the caller-visible error of every auth operation
/// 3. HTTP mapping with structured error logging
///
/// Token failures keep their precise cause internally but are collapsed into a
/// single "invalid token" response at the HTTP boundary.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::auth::TokenKind;

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    EmptyField(String),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(String, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(String, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(String),
}

/// Failures reported by the credential and profile stores
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("duplicate entry: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::RowNotFound => StoreError::NotFound("record not found".to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

/// Why a presented token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Bad signature, bad structure or foreign issuer
    #[error("token is malformed")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("expected {expected} token, got {found} token")]
    WrongKind { expected: TokenKind, found: TokenKind },
    /// The token's subject no longer resolves to an account
    #[error("token subject is unknown")]
    UnknownSubject,
}

/// Configuration errors detected after loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Missing required config: {0}")]
    MissingRequired(String),
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

// ============================================================================
// 2. AUTH OPERATION ERROR
// ============================================================================

/// Error returned by every auth operation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are never distinguished.
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("Missing or invalid authorization header")]
    MissingToken,
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AuthError::UsernameTaken,
            StoreError::NotFound(msg) => AuthError::Internal(msg),
            StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
        }
    }
}

impl AuthError {
    /// Stable code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::UsernameTaken => "USERNAME_TAKEN",
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::Token(_) => "INVALID_TOKEN",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::StoreUnavailable(_) => "SERVICE_UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Validation(e) => e.to_string(),
            AuthError::Token(_) => "Invalid or expired token".to_string(),
            AuthError::StoreUnavailable(_) => "Service temporarily unavailable".to_string(),
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn log_error(&self, error_id: &str) {
        match self {
            AuthError::StoreUnavailable(_) | AuthError::Internal(_) => {
                tracing::error!(error_id = error_id, error = %self, "Auth operation failed");
            }
            AuthError::Token(cause) => {
                tracing::warn!(error_id = error_id, cause = %cause, "Token rejected");
            }
            _ => {
                tracing::warn!(error_id = error_id, code = self.code(), "Auth request rejected");
            }
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Unique error ID, matching the logged event
    pub error_id: String,
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::Token(_) | AuthError::MissingToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::UsernameTaken => StatusCode::CONFLICT,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse::new(
            error_id,
            self.public_message(),
            self.code().to_string(),
            status.as_u16(),
        ))
    }
}
