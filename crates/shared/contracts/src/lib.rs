//! Contracts - The response envelope of the board backend.
//!
//! Every backend response is a `{message, data}` envelope. The `message`
//! discriminator alone decides the shape of `data`; the catalog in this crate
//! records that relation and [`validate_envelope`] enforces it.

pub mod catalog;
pub mod envelope;
pub mod error;
pub mod pagination;
pub mod payloads;

pub use catalog::{check_sentiment, known_error_discriminators, Operation};
pub use envelope::{validate_envelope, validate_for, ApiError, Response};
pub use error::ContractViolation;
pub use pagination::PageRequest;
pub use payloads::*;
