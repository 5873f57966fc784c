//! Authentication errors

use axum::http::StatusCode;

/// Failures of the register/login flow.
///
/// Storage failures are kept apart from credential failures so callers can
/// tell "wrong password" from "database down".
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Credential storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl AuthError {
    /// Stable machine-readable code, used as a log field
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::DuplicateUsername => "duplicate_username",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::StorageUnavailable(_) => "storage_unavailable",
            AuthError::PasswordHash(_) => "password_hash_failed",
        }
    }

    /// Status of the view rendered for a failed submission
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::DuplicateUsername => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
