//! Typed `data` payloads, one per success discriminator.
//!
//! Required fields are plain; fields the backend may omit are `Option` with
//! `#[serde(default)]`, so decoding never depends on them.

use serde::{Deserialize, Serialize};

/// `login_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    pub user_id: i64,
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// `register_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterData {
    pub user_id: i64,
}

/// One entry of a post listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<i64>,
}

/// `get_posts_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<PostSummary>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl PostPage {
    /// Number of pages needed for `total` posts at this page size.
    pub fn total_pages(&self) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (self.total.max(0) + limit - 1) / limit
    }
}

/// `get_post_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub view_count: i64,
    pub like_count: i64,
    pub is_liked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// `create_post_success`, `update_post_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRef {
    pub post_id: i64,
}

/// `like_toggled`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeState {
    pub is_liked: bool,
    pub like_count: i64,
}

/// `view_incremented`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewCount {
    pub view_count: i64,
}

/// Sentiment labels produced by the analysis model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == label)
    }

    /// Korean display label.
    pub fn display_ko(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "긍정적",
            SentimentLabel::Negative => "부정적",
            SentimentLabel::Neutral => "중립적",
        }
    }
}

/// Sentiment attached to a comment or returned by the model API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of a comment listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentItem {
    pub comment_id: i64,
    pub content: String,
    pub author_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// `get_comments_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentList {
    pub comments: Vec<CommentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

/// `create_comment_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedComment {
    pub comment_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// `update_comment_success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRef {
    pub comment_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Image classifier output attached to an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class_name: String,
    pub confidence_score: f64,
}

impl Prediction {
    /// Korean name for the predicted class, falling back to the raw name.
    pub fn class_name_ko(&self) -> &str {
        match self.class_name.to_lowercase().as_str() {
            "dog" => "강아지",
            "cat" => "고양이",
            _ => &self.class_name,
        }
    }
}

/// `upload_success`
///
/// Post uploads answer with `image_url`; profile uploads with
/// `profile_image_url`. At least one of the two is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_error: Option<String>,
}

impl UploadedImage {
    /// URL of the stored image, whichever endpoint produced it.
    pub fn url(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or(self.profile_image_url.as_deref())
    }

    /// Class to store on the post: classifier output, else the echoed class.
    pub fn class_name(&self) -> Option<&str> {
        self.prediction
            .as_ref()
            .map(|p| p.class_name.as_str())
            .or(self.image_class.as_deref())
    }
}
