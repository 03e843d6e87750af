//! Request bodies the harness sends, with their client-side checks.
//!
//! Signup runs the three field validators directly so every violated rule is
//! reported; the simpler forms use `validator` derive rules.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::constants::is_valid_image_class;
use crate::error::{DomainError, DomainResult};
use crate::messages::message_or_key;
use crate::validation::{
    validate_email, validate_nickname, validate_password, validate_password_match,
    ValidationResult, EMAIL_INVALID_FORMAT, EMAIL_REQUIRED, PASSWORD_REQUIRED,
};

const PROFILE_IMAGE_REQUIRED: &str = "프로필 사진을 추가해주세요";

// =============================================================================
// FieldErrors
// =============================================================================

/// Per-field validation messages, in rule order within each field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add one message to a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Merge a validator result under a field name (no-op when valid).
    pub fn absorb(&mut self, field: &str, result: ValidationResult) {
        if !result.is_valid() {
            self.0
                .entry(field.to_string())
                .or_default()
                .extend(result.into_errors());
        }
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when empty, otherwise a form error.
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Form(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errors) in errors.field_errors() {
            for error in errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| message_or_key(&error.code).to_string());
                fields.add(&field.to_string(), message);
            }
        }
        fields
    }
}

/// Run derive rules and convert failures into `DomainError::Form`.
fn check_derived<T: Validate>(value: &T) -> DomainResult<()> {
    value
        .validate()
        .map_err(|e| DomainError::Form(FieldErrors::from(e)))
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

// =============================================================================
// Auth forms
// =============================================================================

/// Signup request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_check: String,
    pub nickname: String,
    pub profile_image_url: Option<String>,
}

impl SignupForm {
    /// Validate every field, collecting all messages per field.
    ///
    /// A missing profile image is reported only when `require_profile_image`
    /// is set; the web form demands one but the backend accepts `null`.
    pub fn check(&self, require_profile_image: bool) -> DomainResult<()> {
        let mut errors = FieldErrors::new();

        let email = self.email.trim();
        if email.is_empty() {
            errors.add("email", EMAIL_REQUIRED);
        } else if !validate_email(Some(email)) {
            errors.add("email", EMAIL_INVALID_FORMAT);
        }
        errors.absorb("password", validate_password(&self.password));
        errors.absorb(
            "password_check",
            validate_password_match(&self.password, &self.password_check),
        );
        errors.absorb("nickname", validate_nickname(self.nickname.trim()));

        let has_image = self
            .profile_image_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());
        if require_profile_image && !has_image {
            errors.add("profile_image_url", PROFILE_IMAGE_REQUIRED);
        }

        errors.into_result()
    }
}

fn email_rule(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(rule_error("email_required", EMAIL_REQUIRED));
    }
    if !validate_email(Some(email)) {
        return Err(rule_error("invalid_email_format", EMAIL_INVALID_FORMAT));
    }
    Ok(())
}

fn password_required_rule(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(rule_error("password_required", PASSWORD_REQUIRED));
    }
    Ok(())
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "email_rule"))]
    pub email: String,
    #[validate(custom(function = "password_required_rule"))]
    pub password: String,
}

impl LoginForm {
    pub fn check(&self) -> DomainResult<()> {
        check_derived(self)
    }
}

// =============================================================================
// Post and comment drafts
// =============================================================================

fn title_rule(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(rule_error("title_required", "제목을 입력해주세요"));
    }
    Ok(())
}

fn content_rule(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(rule_error("content_required", "내용을 입력해주세요"));
    }
    Ok(())
}

fn image_class_rule(class: &str) -> Result<(), ValidationError> {
    if !is_valid_image_class(class) {
        return Err(rule_error("invalid_image_class", "이미지 분류는 Dog 또는 Cat이어야 합니다"));
    }
    Ok(())
}

/// Body for creating or updating a post.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostDraft {
    #[validate(
        custom(function = "title_rule"),
        length(max = 2000, message = "제목은 최대 2000자까지 작성 가능합니다")
    )]
    pub title: String,
    #[validate(custom(function = "content_rule"))]
    pub content: String,
    pub image_url: Option<String>,
    #[validate(custom(function = "image_class_rule"))]
    pub image_class: Option<String>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image_url: None,
            image_class: None,
        }
    }

    /// Attach an uploaded image and its classifier label.
    pub fn with_image(mut self, image_url: impl Into<String>, image_class: Option<String>) -> Self {
        self.image_url = Some(image_url.into());
        self.image_class = image_class;
        self
    }

    pub fn check(&self) -> DomainResult<()> {
        check_derived(self)
    }
}

/// Body for creating or updating a comment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentDraft {
    #[validate(custom(function = "content_rule"))]
    pub content: String,
}

impl CommentDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn check(&self) -> DomainResult<()> {
        check_derived(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{NICKNAME_CONTAINS_SPACE, PASSWORD_MISMATCH, PASSWORD_TOO_SHORT};

    fn signup() -> SignupForm {
        SignupForm {
            email: "testuser@example.com".to_string(),
            password: "TestPassword123!@#".to_string(),
            password_check: "TestPassword123!@#".to_string(),
            nickname: "테스트유저".to_string(),
            profile_image_url: Some("https://example.com/image.jpg".to_string()),
        }
    }

    fn form_errors(result: DomainResult<()>) -> FieldErrors {
        match result {
            Err(DomainError::Form(errors)) => errors,
            other => panic!("expected form error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_signup_passes() {
        assert!(signup().check(true).is_ok());
    }

    #[test]
    fn test_signup_short_password_mentions_length() {
        let form = SignupForm {
            password: "short".to_string(),
            password_check: "short".to_string(),
            ..signup()
        };
        let errors = form_errors(form.check(true));
        assert!(errors.get("password").iter().any(|e| e.contains("8자")));
        assert_eq!(errors.get("password")[0], PASSWORD_TOO_SHORT);
        assert!(errors.get("email").is_empty());
    }

    #[test]
    fn test_signup_collects_every_field() {
        let form = SignupForm {
            email: "".to_string(),
            password: "Password1!".to_string(),
            password_check: "Password2!".to_string(),
            nickname: "닉 네임".to_string(),
            profile_image_url: None,
        };
        let errors = form_errors(form.check(true));
        assert_eq!(errors.get("email"), [EMAIL_REQUIRED]);
        assert_eq!(errors.get("password_check"), [PASSWORD_MISMATCH]);
        assert_eq!(errors.get("nickname"), [NICKNAME_CONTAINS_SPACE]);
        assert_eq!(errors.get("profile_image_url"), [PROFILE_IMAGE_REQUIRED]);
        assert!(errors.get("password").is_empty());
    }

    #[test]
    fn test_signup_profile_image_optional_when_not_required() {
        let form = SignupForm {
            profile_image_url: None,
            ..signup()
        };
        assert!(form.check(false).is_ok());
    }

    #[test]
    fn test_signup_rejects_malformed_email() {
        let form = SignupForm {
            email: "missing@domain".to_string(),
            ..signup()
        };
        let errors = form_errors(form.check(true));
        assert_eq!(errors.get("email"), [EMAIL_INVALID_FORMAT]);
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let form = LoginForm {
            email: "".to_string(),
            password: "".to_string(),
        };
        let errors = form_errors(form.check());
        assert_eq!(errors.get("email"), [EMAIL_REQUIRED]);
        assert_eq!(errors.get("password"), [PASSWORD_REQUIRED]);
    }

    #[test]
    fn test_login_form_rejects_bad_email() {
        let form = LoginForm {
            email: "plainaddress".to_string(),
            password: "whatever".to_string(),
        };
        let errors = form_errors(form.check());
        assert_eq!(errors.get("email"), [EMAIL_INVALID_FORMAT]);
    }

    #[test]
    fn test_post_title_and_content_required() {
        let errors = form_errors(PostDraft::new("  ", "").check());
        assert_eq!(errors.get("title"), ["제목을 입력해주세요"]);
        assert_eq!(errors.get("content"), ["내용을 입력해주세요"]);
    }

    #[test]
    fn test_post_title_max_length() {
        assert!(PostDraft::new("A".repeat(100), "내용").check().is_ok());
        assert!(PostDraft::new("A".repeat(2000), "내용").check().is_ok());
        let errors = form_errors(PostDraft::new("A".repeat(2001), "내용").check());
        assert_eq!(errors.get("title").len(), 1);
    }

    #[test]
    fn test_post_with_image() {
        let draft = PostDraft::new("테스트 게시글 제목", "테스트 게시글 내용입니다.")
            .with_image("https://example.com/image.jpg", Some("Dog".to_string()));
        assert!(draft.check().is_ok());

        let bad = PostDraft::new("제목", "내용")
            .with_image("https://example.com/image.jpg", Some("Bird".to_string()));
        assert!(bad.check().is_err());
    }

    #[test]
    fn test_comment_content_required() {
        assert!(CommentDraft::new("테스트 댓글 내용입니다.").check().is_ok());
        let errors = form_errors(CommentDraft::new("   ").check());
        assert_eq!(errors.get("content"), ["내용을 입력해주세요"]);
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.add("email", EMAIL_REQUIRED);
        errors.add("nickname", NICKNAME_CONTAINS_SPACE);
        assert_eq!(
            errors.to_string(),
            format!("email: {EMAIL_REQUIRED}; nickname: {NICKNAME_CONTAINS_SPACE}")
        );
    }
}
