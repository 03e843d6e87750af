//! Domain-level errors.
//!
//! These errors represent rejected user input and domain rule violations.
//! They are independent of transport concerns (HTTP, JSON decoding).

use thiserror::Error;

use crate::forms::FieldErrors;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// A single input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A form failed validation on one or more fields
    #[error("Form validation failed: {0}")]
    Form(FieldErrors),

    /// An action needs a logged-in session
    #[error("Login required")]
    LoginRequired,

    /// Upload with a MIME type the backend refuses
    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create an unsupported image type error
    pub fn unsupported_image_type(mime: impl Into<String>) -> Self {
        DomainError::UnsupportedImageType(mime.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
