//! User-facing text for backend discriminators.
//!
//! The backend answers with machine-readable `message` strings; the harness
//! shows the matching Korean text when one is known.

/// Discriminator → display text.
const MESSAGES: &[(&str, &str)] = &[
    // Login
    ("email_required", "이메일을 입력해주세요"),
    ("invalid_email_format", "올바른 이메일 주소 형식을 입력해주세요"),
    ("password_required", "비밀번호를 입력해주세요"),
    ("invalid_credentials", "아이디 또는 비밀번호를 확인해주세요"),
    // Signup
    ("invalid_email_character", "이메일은 영문과 @, .만 사용이 가능합니다"),
    ("duplicate_email", "중복된 이메일입니다"),
    (
        "invalid_password_format",
        "비밀번호는 8자 이상, 20자 이하이며 대문자, 소문자, 특수문자를 각각 1개 포함해야 합니다",
    ),
    ("password_check_required", "비밀번호를 한번 더 입력해주세요"),
    ("password_mismatch", "비밀번호가 다릅니다"),
    ("nickname_required", "닉네임을 입력해주세요"),
    ("nickname_contains_space", "띄어쓰기를 없애주세요"),
    ("nickname_too_long", "닉네임은 최대 10자까지 작성 가능합니다"),
    ("duplicate_nickname", "중복된 닉네임입니다"),
    ("profile_image_url_required", "프로필 사진을 추가해주세요"),
    // Posts
    ("title_required", "제목을 입력해주세요"),
    ("content_required", "내용을 입력해주세요"),
    ("post_not_found", "게시글을 찾을 수 없습니다"),
    // Comments
    ("comment_not_found", "댓글을 찾을 수 없습니다"),
    ("unauthorized", "권한이 없습니다"),
    ("forbidden", "권한이 없습니다"),
    // General
    ("network_error", "네트워크 오류가 발생했습니다"),
    ("server_error", "서버 오류가 발생했습니다"),
];

/// Fallback shown when login fails with an unknown discriminator
pub const LOGIN_FAILED: &str = "로그인에 실패했습니다";

/// Fallback shown when signup fails with an unknown discriminator
pub const SIGNUP_FAILED: &str = "회원가입에 실패했습니다";

/// Look up the display text for a discriminator.
pub fn message_for(discriminator: &str) -> Option<&'static str> {
    MESSAGES
        .iter()
        .find(|(key, _)| *key == discriminator)
        .map(|(_, text)| *text)
}

/// Display text for a discriminator, or the discriminator itself.
pub fn message_or_key(discriminator: &str) -> &str {
    message_for(discriminator).unwrap_or(discriminator)
}

/// Signup form field a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Email,
    Password,
    PasswordCheck,
    Nickname,
    ProfileImage,
    /// Not tied to one field; shown as a general notice
    General,
}

impl SignupField {
    /// Route a signup failure discriminator to the field it concerns.
    ///
    /// `password_check*` and `password_mismatch` go to the confirmation field
    /// and must be tested before the broader `password` match.
    pub fn for_discriminator(discriminator: &str) -> Self {
        if discriminator.contains("email") {
            SignupField::Email
        } else if discriminator.contains("password_check") || discriminator == "password_mismatch" {
            SignupField::PasswordCheck
        } else if discriminator.contains("password") {
            SignupField::Password
        } else if discriminator.contains("nickname") {
            SignupField::Nickname
        } else if discriminator.contains("profile") {
            SignupField::ProfileImage
        } else {
            SignupField::General
        }
    }

    /// Form field name, as used in `FieldErrors`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupField::Email => "email",
            SignupField::Password => "password",
            SignupField::PasswordCheck => "password_check",
            SignupField::Nickname => "nickname",
            SignupField::ProfileImage => "profile_image_url",
            SignupField::General => "general",
        }
    }
}
