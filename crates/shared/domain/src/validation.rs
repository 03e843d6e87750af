//! Client-side input rules for the auth forms.
//!
//! Each validator is a pure function: same input, same result, no panics.
//! Empty input is a defined case that yields a single "required" message.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::constants::{
    EMAIL_PATTERN, MAX_NICKNAME_LENGTH, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
    PASSWORD_SPECIAL_CHARS,
};

// =============================================================================
// Messages
// =============================================================================

pub const PASSWORD_REQUIRED: &str = "비밀번호를 입력해주세요";
pub const PASSWORD_TOO_SHORT: &str = "8자 이상이어야 합니다";
pub const PASSWORD_TOO_LONG: &str = "20자 이하여야 합니다";
pub const PASSWORD_MISSING_UPPERCASE: &str = "대문자가 필요합니다";
pub const PASSWORD_MISSING_LOWERCASE: &str = "소문자가 필요합니다";
pub const PASSWORD_MISSING_DIGIT: &str = "숫자가 필요합니다";
pub const PASSWORD_MISSING_SPECIAL: &str = "특수문자가 필요합니다";
pub const PASSWORD_CHECK_REQUIRED: &str = "비밀번호를 한번 더 입력해주세요";
pub const PASSWORD_MISMATCH: &str = "비밀번호가 다릅니다";

pub const NICKNAME_REQUIRED: &str = "닉네임을 입력해주세요";
pub const NICKNAME_CONTAINS_SPACE: &str = "공백을 포함할 수 없습니다";
pub const NICKNAME_TOO_LONG: &str = "10자 이하여야 합니다";

pub const EMAIL_REQUIRED: &str = "이메일을 입력해주세요";
pub const EMAIL_INVALID_FORMAT: &str = "올바른 이메일 주소 형식을 입력해주세요";

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

// =============================================================================
// ValidationResult
// =============================================================================

/// Outcome of a validator: the ordered list of violated rules.
///
/// Validity is derived from the error list, so the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    /// A result with no violations.
    pub fn ok() -> Self {
        Self::default()
    }

    /// A result carrying exactly one message.
    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// True if any message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.contains(needle))
    }

    fn push_if(&mut self, violated: bool, message: &str) {
        if violated {
            self.errors.push(message.to_string());
        }
    }
}

// Serialized as `{"valid": bool, "errors": [..]}`
impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 2)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors)?;
        state.end()
    }
}

// =============================================================================
// Validators
// =============================================================================

/// Check an email address against the signup pattern.
///
/// `None` and the empty string are rejected. Only ASCII letters, digits and
/// `._%+-` are allowed in the local part, so any other script fails.
pub fn validate_email(email: Option<&str>) -> bool {
    match email {
        Some(email) if !email.is_empty() => EMAIL_REGEX.is_match(email),
        _ => false,
    }
}

/// Check a password against the length and character-class rules.
///
/// Every rule is evaluated; the result lists all violations in rule order.
pub fn validate_password(password: &str) -> ValidationResult {
    if password.is_empty() {
        return ValidationResult::single(PASSWORD_REQUIRED);
    }

    let length = password.chars().count();
    let mut result = ValidationResult::ok();

    result.push_if(length < MIN_PASSWORD_LENGTH, PASSWORD_TOO_SHORT);
    result.push_if(length > MAX_PASSWORD_LENGTH, PASSWORD_TOO_LONG);
    result.push_if(
        !password.chars().any(|c| c.is_ascii_uppercase()),
        PASSWORD_MISSING_UPPERCASE,
    );
    result.push_if(
        !password.chars().any(|c| c.is_ascii_lowercase()),
        PASSWORD_MISSING_LOWERCASE,
    );
    result.push_if(
        !password.chars().any(|c| c.is_ascii_digit()),
        PASSWORD_MISSING_DIGIT,
    );
    result.push_if(
        !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)),
        PASSWORD_MISSING_SPECIAL,
    );

    result
}

/// Check a nickname: required, no spaces, at most 10 characters.
pub fn validate_nickname(nickname: &str) -> ValidationResult {
    if nickname.trim().is_empty() {
        return ValidationResult::single(NICKNAME_REQUIRED);
    }

    let mut result = ValidationResult::ok();
    result.push_if(nickname.contains(' '), NICKNAME_CONTAINS_SPACE);
    result.push_if(
        nickname.chars().count() > MAX_NICKNAME_LENGTH,
        NICKNAME_TOO_LONG,
    );
    result
}

/// Check the password confirmation field of the signup form.
pub fn validate_password_match(password: &str, password_check: &str) -> ValidationResult {
    if password_check.is_empty() {
        return ValidationResult::single(PASSWORD_CHECK_REQUIRED);
    }
    if !password.is_empty() && password != password_check {
        return ValidationResult::single(PASSWORD_MISMATCH);
    }
    ValidationResult::ok()
}
