//! Response contract catalog.
//!
//! One entry per backend operation: its success discriminator, the fields its
//! payload must carry, and the error discriminators it is known to return.

use serde_json::{Map, Value};

use crate::error::ContractViolation;
use crate::payloads::SentimentLabel;

/// Backend operations the harness can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Signup,
    ListPosts,
    GetPost,
    CreatePost,
    UpdatePost,
    DeletePost,
    ToggleLike,
    IncrementView,
    ListComments,
    CreateComment,
    UpdateComment,
    DeleteComment,
    UploadImage,
    DeleteAccount,
}

struct Entry {
    operation: Operation,
    name: &'static str,
    success: &'static str,
    required: &'static [&'static str],
    errors: &'static [&'static str],
    carries_data: bool,
}

const CATALOG: &[Entry] = &[
    Entry {
        operation: Operation::Login,
        name: "login",
        success: "login_success",
        required: &["user_id", "nickname"],
        errors: &["invalid_credentials"],
        carries_data: true,
    },
    Entry {
        operation: Operation::Signup,
        name: "signup",
        success: "register_success",
        required: &["user_id"],
        errors: &["duplicate_email", "duplicate_nickname"],
        carries_data: true,
    },
    Entry {
        operation: Operation::ListPosts,
        name: "list posts",
        success: "get_posts_success",
        required: &["posts", "total", "page", "limit"],
        errors: &[],
        carries_data: true,
    },
    Entry {
        operation: Operation::GetPost,
        name: "get post",
        success: "get_post_success",
        required: &[
            "post_id",
            "title",
            "content",
            "author_id",
            "view_count",
            "like_count",
            "is_liked",
        ],
        errors: &["post_not_found"],
        carries_data: true,
    },
    Entry {
        operation: Operation::CreatePost,
        name: "create post",
        success: "create_post_success",
        required: &["post_id"],
        errors: &[],
        carries_data: true,
    },
    Entry {
        operation: Operation::UpdatePost,
        name: "update post",
        success: "update_post_success",
        required: &["post_id"],
        errors: &[],
        carries_data: true,
    },
    Entry {
        operation: Operation::DeletePost,
        name: "delete post",
        success: "delete_post_success",
        required: &[],
        errors: &[],
        carries_data: false,
    },
    Entry {
        operation: Operation::ToggleLike,
        name: "like toggle",
        success: "like_toggled",
        required: &["is_liked", "like_count"],
        errors: &[],
        carries_data: true,
    },
    Entry {
        operation: Operation::IncrementView,
        name: "view increment",
        success: "view_incremented",
        required: &["view_count"],
        errors: &[],
        carries_data: true,
    },
    Entry {
        operation: Operation::ListComments,
        name: "list comments",
        success: "get_comments_success",
        required: &["comments"],
        errors: &[],
        carries_data: true,
    },
    Entry {
        operation: Operation::CreateComment,
        name: "create comment",
        success: "create_comment_success",
        required: &["comment_id"],
        errors: &["content_required", "post_not_found"],
        carries_data: true,
    },
    Entry {
        operation: Operation::UpdateComment,
        name: "update comment",
        success: "update_comment_success",
        required: &["comment_id"],
        errors: &["unauthorized", "forbidden"],
        carries_data: true,
    },
    Entry {
        operation: Operation::DeleteComment,
        name: "delete comment",
        success: "delete_comment_success",
        required: &[],
        errors: &["comment_not_found"],
        carries_data: false,
    },
    Entry {
        operation: Operation::UploadImage,
        name: "upload image",
        success: "upload_success",
        required: &["image_url"],
        errors: &[],
        carries_data: true,
    },
    Entry {
        operation: Operation::DeleteAccount,
        name: "delete account",
        success: "delete_user_success",
        required: &[],
        errors: &["unauthorized"],
        carries_data: false,
    },
];

/// Alternative names that satisfy a required field.
const FIELD_ALIASES: &[(&str, &str)] = &[("image_url", "profile_image_url")];

/// Fields every item of `posts` must expose.
pub const POST_ITEM_FIELDS: &[&str] = &["post_id", "title", "content", "author_id"];

/// Fields every item of `comments` must expose.
pub const COMMENT_ITEM_FIELDS: &[&str] = &["comment_id", "content", "author_id"];

impl Operation {
    pub const ALL: [Operation; 15] = [
        Operation::Login,
        Operation::Signup,
        Operation::ListPosts,
        Operation::GetPost,
        Operation::CreatePost,
        Operation::UpdatePost,
        Operation::DeletePost,
        Operation::ToggleLike,
        Operation::IncrementView,
        Operation::ListComments,
        Operation::CreateComment,
        Operation::UpdateComment,
        Operation::DeleteComment,
        Operation::UploadImage,
        Operation::DeleteAccount,
    ];

    fn entry(&self) -> &'static Entry {
        // CATALOG lists every variant, in declaration order
        &CATALOG[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    pub fn success_discriminator(&self) -> &'static str {
        self.entry().success
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        self.entry().required
    }

    pub fn error_discriminators(&self) -> &'static [&'static str] {
        self.entry().errors
    }

    /// Whether a success response carries a `data` object.
    pub fn carries_data(&self) -> bool {
        self.entry().carries_data
    }

    /// The operation whose success discriminator is `discriminator`.
    pub fn for_success(discriminator: &str) -> Option<Operation> {
        CATALOG
            .iter()
            .find(|e| e.success == discriminator)
            .map(|e| e.operation)
    }

    /// Whether `discriminator` is a response this operation can produce.
    pub fn accepts(&self, discriminator: &str) -> bool {
        self.success_discriminator() == discriminator
            || self
                .error_discriminators()
                .iter()
                .any(|e| *e == discriminator)
    }

    /// Item collection the payload holds, with the fields each item needs.
    pub(crate) fn collection(&self) -> Option<(&'static str, &'static [&'static str])> {
        match self {
            Operation::ListPosts => Some(("posts", POST_ITEM_FIELDS)),
            Operation::ListComments => Some(("comments", COMMENT_ITEM_FIELDS)),
            _ => None,
        }
    }
}

/// Every error discriminator named by the catalog.
pub fn known_error_discriminators() -> impl Iterator<Item = &'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    for entry in CATALOG {
        for &error in entry.errors {
            if !seen.contains(&error) {
                seen.push(error);
            }
        }
    }
    seen.into_iter()
}

fn has_field(object: &Map<String, Value>, field: &str) -> bool {
    let present = |name: &str| object.get(name).is_some_and(|v| !v.is_null());
    present(field)
        || FIELD_ALIASES
            .iter()
            .any(|(canonical, alias)| *canonical == field && present(alias))
}

/// Check the shape of a success payload against its catalog entry.
pub(crate) fn check_payload(
    operation: Operation,
    discriminator: &str,
    object: &Map<String, Value>,
) -> Result<(), ContractViolation> {
    for &field in operation.required_fields() {
        if !has_field(object, field) {
            return Err(ContractViolation::missing_field(discriminator, field));
        }
    }

    if let Some((collection, item_fields)) = operation.collection() {
        let items = object
            .get(collection)
            .and_then(Value::as_array)
            .ok_or_else(|| ContractViolation::NotASequence {
                discriminator: discriminator.to_string(),
                field: collection,
            })?;

        for (index, item) in items.iter().enumerate() {
            let item = item.as_object();
            for &field in item_fields {
                if !item.is_some_and(|i| has_field(i, field)) {
                    return Err(ContractViolation::MissingItemField {
                        discriminator: discriminator.to_string(),
                        collection,
                        index,
                        field,
                    });
                }
            }
            if let Some(sentiment) = item.and_then(|i| i.get("sentiment")) {
                check_sentiment(sentiment)?;
            }
        }
    }

    if let Some(sentiment) = object.get("sentiment") {
        check_sentiment(sentiment)?;
    }

    Ok(())
}

/// Check a sentiment value: known label, confidence within [0.0, 1.0].
///
/// `null` counts as "no sentiment" and passes.
pub fn check_sentiment(value: &Value) -> Result<(), ContractViolation> {
    if value.is_null() {
        return Ok(());
    }

    let label = value
        .get("label")
        .and_then(Value::as_str)
        .ok_or(ContractViolation::IncompleteSentiment("label"))?;
    if SentimentLabel::parse(label).is_none() {
        return Err(ContractViolation::InvalidSentimentLabel(label.to_string()));
    }

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or(ContractViolation::IncompleteSentiment("confidence"))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ContractViolation::ConfidenceOutOfRange(confidence));
    }

    Ok(())
}
