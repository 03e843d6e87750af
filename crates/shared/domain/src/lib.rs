//! Domain layer - Input rules and session context for the board harness.
//!
//! This crate contains pure logic with no transport dependencies:
//! validators for the auth forms, request body types, user-facing
//! messages, and the explicit session passed to every request.

pub mod constants;
pub mod error;
pub mod forms;
pub mod messages;
pub mod session;
pub mod validation;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use forms::{CommentDraft, FieldErrors, LoginForm, PostDraft, SignupForm};
pub use messages::{message_for, message_or_key, SignupField, LOGIN_FAILED, SIGNUP_FAILED};
pub use session::{CurrentUser, Session};
pub use validation::{
    validate_email, validate_nickname, validate_password, validate_password_match,
    ValidationResult,
};
