//! Contract violations.
//!
//! Raised when a response envelope does not match the catalog entry for its
//! discriminator. A violation is never tolerated silently.

use thiserror::Error;

/// A response that does not conform to the catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("response has no string `message` discriminator")]
    MissingMessage,

    #[error("unknown discriminator `{0}` carries a payload")]
    UnknownDiscriminator(String),

    #[error("`{discriminator}` must not carry data")]
    UnexpectedData { discriminator: String },

    #[error("`{discriminator}` requires a data object")]
    MissingData { discriminator: String },

    #[error("`{discriminator}` payload is missing `{field}`")]
    MissingField {
        discriminator: String,
        field: &'static str,
    },

    #[error("`{discriminator}` field `{field}` must be a sequence")]
    NotASequence {
        discriminator: String,
        field: &'static str,
    },

    #[error("`{discriminator}` {collection}[{index}] is missing `{field}`")]
    MissingItemField {
        discriminator: String,
        collection: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("sentiment label `{0}` is not positive, negative or neutral")]
    InvalidSentimentLabel(String),

    #[error("sentiment confidence {0} is outside [0.0, 1.0]")]
    ConfidenceOutOfRange(f64),

    #[error("sentiment payload is missing `{0}`")]
    IncompleteSentiment(&'static str),

    #[error("`{discriminator}` is not a response of {operation}")]
    WrongOperation {
        operation: &'static str,
        discriminator: String,
    },

    #[error("`{discriminator}` payload is malformed: {reason}")]
    Malformed {
        discriminator: String,
        reason: String,
    },
}

impl ContractViolation {
    pub(crate) fn missing_field(discriminator: &str, field: &'static str) -> Self {
        ContractViolation::MissingField {
            discriminator: discriminator.to_string(),
            field,
        }
    }

    pub(crate) fn malformed(discriminator: &str, reason: impl ToString) -> Self {
        ContractViolation::Malformed {
            discriminator: discriminator.to_string(),
            reason: reason.to_string(),
        }
    }
}
