//! Unified error handling for the harness.
//!
//! Every failure a caller can see is one of: rejected local input, a response
//! that breaks the contract catalog, or a failed transport call. Backend error
//! discriminators are not errors here; they come back as ordinary replies.

use contracts::ContractViolation;
use domain::{DomainError, FieldErrors};
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Local checks
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Form(FieldErrors),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // Authentication
    #[error("Authentication required")]
    Unauthorized,

    // Backend replies
    #[error("Contract violation: {0}")]
    ContractViolation(#[from] ContractViolation),

    #[error("Transport error{}: {body}", http_suffix(.status))]
    Transport { status: Option<u16>, body: String },

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for display and scripting
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) | AppError::Form(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::ContractViolation(_) => "CONTRACT_VIOLATION",
            AppError::Transport { .. } => "TRANSPORT_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Form(fields) => fields.to_string(),
            AppError::Unauthorized => "로그인이 필요합니다".to_string(),
            AppError::Transport { status: None, body } => {
                tracing::warn!("Transport error: {}", body);
                domain::message_or_key("network_error").to_string()
            }
            AppError::Transport { status: Some(status), body } => {
                tracing::warn!("Transport error (HTTP {}): {}", status, body);
                format!("{} (HTTP {})", domain::message_or_key("server_error"), status)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether the error was raised before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Form(_)
                | AppError::BadRequest(_)
                | AppError::Unauthorized
        )
    }

    /// Per-field messages, for form failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Form(fields) => Some(fields),
            _ => None,
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Form(fields) => AppError::Form(fields),
            DomainError::LoginRequired => AppError::Unauthorized,
            DomainError::UnsupportedImageType(mime) => {
                AppError::BadRequest(format!("unsupported image type `{mime}`"))
            }
        }
    }
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn transport(status: Option<u16>, body: impl Into<String>) -> Self {
        AppError::Transport {
            status,
            body: body.into(),
        }
    }
}
