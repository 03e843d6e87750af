//! Domain-level constants.
//!
//! These constants define the client-side input rules and the conventions
//! shared with the backend.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement (in characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (in characters)
pub const MAX_PASSWORD_LENGTH: usize = 20;

/// Characters that satisfy the "special character" password rule
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()-_=+[]{}|;:'\",.<>/?`~";

/// Maximum nickname length, counted in Unicode scalar values
pub const MAX_NICKNAME_LENGTH: usize = 10;

/// Email shape accepted by the signup and login forms
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

// =============================================================================
// Pagination
// =============================================================================

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Default number of posts per page
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Maximum allowed posts per page
pub const MAX_PAGE_LIMIT: u32 = 100;

// =============================================================================
// Authentication
// =============================================================================

/// Header carrying the caller's user id on authenticated requests
pub const USER_ID_HEADER: &str = "X-User-Id";

// =============================================================================
// Uploads
// =============================================================================

/// Multipart field name used by both upload endpoints
pub const UPLOAD_FIELD_NAME: &str = "file";

/// MIME types the upload endpoints accept
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg"];

/// Check if a MIME type may be uploaded
pub fn is_allowed_image_type(mime: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime)
}

/// Image classes the classifier can attach to a post
pub const IMAGE_CLASSES: &[&str] = &["Dog", "Cat"];

/// Check if an image class label is one the backend produces
pub fn is_valid_image_class(class: &str) -> bool {
    IMAGE_CLASSES.contains(&class)
}
