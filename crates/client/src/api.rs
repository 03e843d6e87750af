//! The backend API seam.

use std::path::Path;

use async_trait::async_trait;
use common::{AppError, AppResult};
use contracts::{check_sentiment, PageRequest, Response, Sentiment};
use domain::{
    is_allowed_image_type, message_for, CommentDraft, DomainError, LoginForm, PostDraft, Session,
    SignupForm,
};
use serde_json::Value;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A backend reply that passed the contract catalog.
///
/// Error discriminators (`invalid_credentials`, `post_not_found`, ...) are
/// replies too; only transport failures and contract violations are `Err`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub response: Response,
}

impl ApiReply {
    pub fn new(status: u16, response: Response) -> Self {
        Self { status, response }
    }

    pub fn is_success(&self) -> bool {
        self.response.is_success()
    }

    pub fn discriminator(&self) -> &str {
        self.response.discriminator()
    }

    /// Localized text for the discriminator, when one exists.
    pub fn message(&self) -> Option<&'static str> {
        message_for(self.discriminator())
    }
}

/// A reply from an endpoint outside the envelope contract (model API, health).
#[derive(Debug, Clone, PartialEq)]
pub struct RawReply {
    pub status: u16,
    pub body: Value,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Sentiment carried by the body, at the top level or under `data`.
    pub fn sentiment(&self) -> Option<Sentiment> {
        let candidates = [Some(&self.body), self.body.get("data")];
        candidates
            .into_iter()
            .flatten()
            .filter(|v| v.get("label").is_some() && check_sentiment(v).is_ok())
            .find_map(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// An image file to send as a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read an image from disk, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::bad_request(format!("cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        };

        Ok(Self::new(file_name, mime_type, bytes))
    }

    /// Reject MIME types the upload endpoints refuse.
    pub fn check(&self) -> AppResult<()> {
        if is_allowed_image_type(&self.mime_type) {
            Ok(())
        } else {
            Err(DomainError::unsupported_image_type(&self.mime_type).into())
        }
    }
}

/// Backend and model API calls.
///
/// Every call takes the caller's [`Session`]; when it holds a user the
/// request carries the user id header. Calls that change data fail with
/// `AppError::Unauthorized` before any request is sent if nobody is logged in.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BoardApi: Send + Sync {
    // Auth

    async fn login(&self, form: &LoginForm) -> AppResult<ApiReply>;

    async fn signup(&self, form: &SignupForm) -> AppResult<ApiReply>;

    /// Upload a profile picture (used during signup, no session needed)
    async fn upload_profile_image(&self, image: ImageUpload) -> AppResult<ApiReply>;

    /// Delete the logged-in user's account
    async fn delete_account(&self, session: &Session) -> AppResult<ApiReply>;

    // Posts

    async fn list_posts(&self, session: &Session, page: PageRequest) -> AppResult<ApiReply>;

    async fn get_post(&self, session: &Session, post_id: i64) -> AppResult<ApiReply>;

    async fn create_post(&self, session: &Session, draft: &PostDraft) -> AppResult<ApiReply>;

    async fn update_post(
        &self,
        session: &Session,
        post_id: i64,
        draft: &PostDraft,
    ) -> AppResult<ApiReply>;

    async fn delete_post(&self, session: &Session, post_id: i64) -> AppResult<ApiReply>;

    async fn toggle_like(&self, session: &Session, post_id: i64) -> AppResult<ApiReply>;

    async fn increment_view(&self, session: &Session, post_id: i64) -> AppResult<ApiReply>;

    /// Upload a post image; the reply carries the classifier prediction
    async fn upload_post_image(&self, session: &Session, image: ImageUpload)
        -> AppResult<ApiReply>;

    // Comments

    async fn list_comments(&self, session: &Session, post_id: i64) -> AppResult<ApiReply>;

    async fn create_comment(
        &self,
        session: &Session,
        post_id: i64,
        draft: &CommentDraft,
    ) -> AppResult<ApiReply>;

    async fn update_comment(
        &self,
        session: &Session,
        post_id: i64,
        comment_id: i64,
        draft: &CommentDraft,
    ) -> AppResult<ApiReply>;

    async fn delete_comment(
        &self,
        session: &Session,
        post_id: i64,
        comment_id: i64,
    ) -> AppResult<ApiReply>;

    // Model API

    async fn analyze_sentiment(&self, text: &str) -> AppResult<RawReply>;

    async fn analyze_sentiment_gemini(&self, text: &str) -> AppResult<RawReply>;

    // Health

    async fn health(&self) -> AppResult<RawReply>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ApiError, SentimentLabel};
    use serde_json::json;

    #[test]
    fn test_reply_message_is_localized() {
        let reply = ApiReply::new(401, Response::Error(ApiError::InvalidCredentials));
        assert!(!reply.is_success());
        assert_eq!(reply.discriminator(), "invalid_credentials");
        assert_eq!(reply.message(), Some("아이디 또는 비밀번호를 확인해주세요"));

        let reply = ApiReply::new(200, Response::DeletePostSuccess);
        assert!(reply.is_success());
    }

    #[test]
    fn test_raw_reply_sentiment() {
        let top_level = RawReply {
            status: 200,
            body: json!({ "label": "positive", "confidence": 0.91 }),
        };
        let sentiment = top_level.sentiment().unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Positive);

        let nested = RawReply {
            status: 200,
            body: json!({ "message": "ok", "data": { "label": "negative", "confidence": 0.7 } }),
        };
        assert_eq!(nested.sentiment().map(|s| s.label), Some(SentimentLabel::Negative));

        let out_of_range = RawReply {
            status: 200,
            body: json!({ "label": "positive", "confidence": 7 }),
        };
        assert_eq!(out_of_range.sentiment(), None);
    }

    #[test]
    fn test_image_type_check() {
        let png = ImageUpload::new("cat.png", "image/png", vec![0x89, 0x50]);
        assert!(png.check().is_ok());

        let gif = ImageUpload::new("cat.gif", "image/gif", vec![0x47]);
        let err = gif.check().unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_mock_board_api() {
        let mut api = MockBoardApi::new();
        api.expect_toggle_like()
            .withf(|session, post_id| session.is_logged_in() && *post_id == 7)
            .times(1)
            .returning(|_, _| {
                Ok(ApiReply::new(
                    200,
                    Response::LikeToggled(contracts::LikeState {
                        is_liked: true,
                        like_count: 3,
                    }),
                ))
            });

        let session = Session::for_user(domain::CurrentUser {
            user_id: 1,
            nickname: "유저".to_string(),
            profile_image_url: None,
        });
        let reply = api.toggle_like(&session, 7).await.unwrap();
        assert_eq!(reply.discriminator(), "like_toggled");
    }
}
