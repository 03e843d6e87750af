//! The `{message, data}` envelope as a tagged enum.
//!
//! Every discriminator in the catalog maps to one `Response` variant, so a
//! decoded response always carries the payload type its tag promises.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::{check_payload, Operation};
use crate::error::ContractViolation;
use crate::payloads::{
    CommentList, CommentRef, CreatedComment, LikeState, LoginData, PostDetail, PostPage, PostRef,
    RegisterData, UploadedImage, ViewCount,
};

/// Error discriminators the backend returns, with `data: null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InvalidCredentials,
    DuplicateEmail,
    DuplicateNickname,
    PostNotFound,
    ContentRequired,
    Unauthorized,
    Forbidden,
    CommentNotFound,
    /// A discriminator the catalog does not name (e.g. `invalid_password_format`)
    Other(String),
}

impl ApiError {
    pub fn from_discriminator(discriminator: &str) -> Self {
        match discriminator {
            "invalid_credentials" => ApiError::InvalidCredentials,
            "duplicate_email" => ApiError::DuplicateEmail,
            "duplicate_nickname" => ApiError::DuplicateNickname,
            "post_not_found" => ApiError::PostNotFound,
            "content_required" => ApiError::ContentRequired,
            "unauthorized" => ApiError::Unauthorized,
            "forbidden" => ApiError::Forbidden,
            "comment_not_found" => ApiError::CommentNotFound,
            other => ApiError::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::DuplicateEmail => "duplicate_email",
            ApiError::DuplicateNickname => "duplicate_nickname",
            ApiError::PostNotFound => "post_not_found",
            ApiError::ContentRequired => "content_required",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden => "forbidden",
            ApiError::CommentNotFound => "comment_not_found",
            ApiError::Other(discriminator) => discriminator,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ApiError::Other(_))
    }
}

/// A backend response, one variant per discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    LoginSuccess(LoginData),
    RegisterSuccess(RegisterData),
    GetPostsSuccess(PostPage),
    GetPostSuccess(PostDetail),
    CreatePostSuccess(PostRef),
    UpdatePostSuccess(PostRef),
    DeletePostSuccess,
    LikeToggled(LikeState),
    ViewIncremented(ViewCount),
    GetCommentsSuccess(CommentList),
    CreateCommentSuccess(CreatedComment),
    UpdateCommentSuccess(CommentRef),
    DeleteCommentSuccess,
    UploadSuccess(UploadedImage),
    DeleteUserSuccess,
    Error(ApiError),
}

impl Response {
    /// Operation whose success this is; `None` for error responses.
    pub fn operation(&self) -> Option<Operation> {
        let operation = match self {
            Response::LoginSuccess(_) => Operation::Login,
            Response::RegisterSuccess(_) => Operation::Signup,
            Response::GetPostsSuccess(_) => Operation::ListPosts,
            Response::GetPostSuccess(_) => Operation::GetPost,
            Response::CreatePostSuccess(_) => Operation::CreatePost,
            Response::UpdatePostSuccess(_) => Operation::UpdatePost,
            Response::DeletePostSuccess => Operation::DeletePost,
            Response::LikeToggled(_) => Operation::ToggleLike,
            Response::ViewIncremented(_) => Operation::IncrementView,
            Response::GetCommentsSuccess(_) => Operation::ListComments,
            Response::CreateCommentSuccess(_) => Operation::CreateComment,
            Response::UpdateCommentSuccess(_) => Operation::UpdateComment,
            Response::DeleteCommentSuccess => Operation::DeleteComment,
            Response::UploadSuccess(_) => Operation::UploadImage,
            Response::DeleteUserSuccess => Operation::DeleteAccount,
            Response::Error(_) => return None,
        };
        Some(operation)
    }

    /// The `message` tag of this response.
    pub fn discriminator(&self) -> &str {
        match (self.operation(), self) {
            (Some(operation), _) => operation.success_discriminator(),
            (None, Response::Error(error)) => error.as_str(),
            (None, _) => "",
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Response::Error(_))
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Response::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Payload as JSON (`Null` when the response carries none).
    pub fn data(&self) -> Value {
        serde_json::to_value(self.data_ref()).unwrap_or(Value::Null)
    }

    fn data_ref(&self) -> DataRef<'_> {
        match self {
            Response::LoginSuccess(d) => DataRef::Login(d),
            Response::RegisterSuccess(d) => DataRef::Register(d),
            Response::GetPostsSuccess(d) => DataRef::Posts(d),
            Response::GetPostSuccess(d) => DataRef::Post(d),
            Response::CreatePostSuccess(d) | Response::UpdatePostSuccess(d) => DataRef::PostRef(d),
            Response::LikeToggled(d) => DataRef::Like(d),
            Response::ViewIncremented(d) => DataRef::Views(d),
            Response::GetCommentsSuccess(d) => DataRef::Comments(d),
            Response::CreateCommentSuccess(d) => DataRef::CreatedComment(d),
            Response::UpdateCommentSuccess(d) => DataRef::CommentRef(d),
            Response::UploadSuccess(d) => DataRef::Upload(d),
            Response::DeletePostSuccess
            | Response::DeleteCommentSuccess
            | Response::DeleteUserSuccess
            | Response::Error(_) => DataRef::Null,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum DataRef<'a> {
    Login(&'a LoginData),
    Register(&'a RegisterData),
    Posts(&'a PostPage),
    Post(&'a PostDetail),
    PostRef(&'a PostRef),
    Like(&'a LikeState),
    Views(&'a ViewCount),
    Comments(&'a CommentList),
    CreatedComment(&'a CreatedComment),
    CommentRef(&'a CommentRef),
    Upload(&'a UploadedImage),
    Null,
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 2)?;
        state.serialize_field("message", self.discriminator())?;
        state.serialize_field("data", &self.data_ref())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        validate_envelope(&value).map_err(D::Error::custom)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Shape of a discriminator: a snake_case tag, never prose.
static DISCRIMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("discriminator pattern is a valid regex"));

/// Check a raw response body against the catalog and decode it.
///
/// Error discriminators the catalog does not name are accepted as
/// `ApiError::Other` as long as they are snake_case tags carrying no payload.
pub fn validate_envelope(value: &Value) -> Result<Response, ContractViolation> {
    let object = value.as_object().ok_or(ContractViolation::NotAnObject)?;
    let message = object
        .get("message")
        .and_then(Value::as_str)
        .ok_or(ContractViolation::MissingMessage)?;
    let data = object.get("data").filter(|d| !d.is_null());

    let result = match Operation::for_success(message) {
        Some(operation) => decode_success(operation, message, data),
        None => decode_error(message, data),
    };

    if let Err(violation) = &result {
        warn!(discriminator = message, %violation, "Contract violation");
    }
    result
}

/// Like [`validate_envelope`], and the discriminator must belong to `operation`.
pub fn validate_for(operation: Operation, value: &Value) -> Result<Response, ContractViolation> {
    let response = validate_envelope(value)?;
    if !operation.accepts(response.discriminator()) {
        return Err(ContractViolation::WrongOperation {
            operation: operation.name(),
            discriminator: response.discriminator().to_string(),
        });
    }
    Ok(response)
}

fn decode_error(message: &str, data: Option<&Value>) -> Result<Response, ContractViolation> {
    let error = ApiError::from_discriminator(message);
    if !error.is_known() && !DISCRIMINATOR.is_match(message) {
        return Err(ContractViolation::UnknownDiscriminator(message.to_string()));
    }
    if data.is_some() {
        return Err(if error.is_known() {
            ContractViolation::UnexpectedData {
                discriminator: message.to_string(),
            }
        } else {
            ContractViolation::UnknownDiscriminator(message.to_string())
        });
    }
    Ok(Response::Error(error))
}

fn decode_success(
    operation: Operation,
    message: &str,
    data: Option<&Value>,
) -> Result<Response, ContractViolation> {
    let response = match operation {
        Operation::Login => Response::LoginSuccess(decode(operation, message, data)?),
        Operation::Signup => Response::RegisterSuccess(decode(operation, message, data)?),
        Operation::ListPosts => Response::GetPostsSuccess(decode(operation, message, data)?),
        Operation::GetPost => Response::GetPostSuccess(decode(operation, message, data)?),
        Operation::CreatePost => Response::CreatePostSuccess(decode(operation, message, data)?),
        Operation::UpdatePost => Response::UpdatePostSuccess(decode(operation, message, data)?),
        Operation::ToggleLike => Response::LikeToggled(decode(operation, message, data)?),
        Operation::IncrementView => Response::ViewIncremented(decode(operation, message, data)?),
        Operation::ListComments => {
            Response::GetCommentsSuccess(decode(operation, message, data)?)
        }
        Operation::CreateComment => {
            Response::CreateCommentSuccess(decode(operation, message, data)?)
        }
        Operation::UpdateComment => {
            Response::UpdateCommentSuccess(decode(operation, message, data)?)
        }
        Operation::UploadImage => Response::UploadSuccess(decode(operation, message, data)?),
        Operation::DeletePost => {
            expect_no_data(message, data)?;
            Response::DeletePostSuccess
        }
        Operation::DeleteComment => {
            expect_no_data(message, data)?;
            Response::DeleteCommentSuccess
        }
        Operation::DeleteAccount => {
            expect_no_data(message, data)?;
            Response::DeleteUserSuccess
        }
    };
    Ok(response)
}

fn expect_no_data(message: &str, data: Option<&Value>) -> Result<(), ContractViolation> {
    match data {
        None => Ok(()),
        Some(_) => Err(ContractViolation::UnexpectedData {
            discriminator: message.to_string(),
        }),
    }
}

fn decode<T: DeserializeOwned>(
    operation: Operation,
    message: &str,
    data: Option<&Value>,
) -> Result<T, ContractViolation> {
    let object = data
        .and_then(Value::as_object)
        .ok_or_else(|| ContractViolation::MissingData {
            discriminator: message.to_string(),
        })?;

    check_payload(operation, message, object)?;

    T::deserialize(Value::Object(object.clone()))
        .map_err(|e| ContractViolation::malformed(message, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_success_decodes() {
        let response = validate_envelope(&json!({
            "message": "login_success",
            "data": {
                "user_id": 1,
                "nickname": "테스트유저",
                "profile_image_url": "https://example.com/image.jpg"
            }
        }))
        .unwrap();

        match response {
            Response::LoginSuccess(data) => {
                assert_eq!(data.user_id, 1);
                assert_eq!(data.nickname, "테스트유저");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_discriminator_with_null_data() {
        let response = validate_envelope(&json!({ "message": "invalid_credentials", "data": null }))
            .unwrap();
        assert_eq!(response, Response::Error(ApiError::InvalidCredentials));
        assert!(!response.is_success());
        assert_eq!(response.discriminator(), "invalid_credentials");
    }

    #[test]
    fn test_error_discriminator_without_data_key() {
        let response = validate_envelope(&json!({ "message": "duplicate_email" })).unwrap();
        assert_eq!(response.error(), Some(&ApiError::DuplicateEmail));
    }

    #[test]
    fn test_error_discriminator_with_data_is_violation() {
        assert_eq!(
            validate_envelope(&json!({ "message": "post_not_found", "data": { "post_id": 1 } })),
            Err(ContractViolation::UnexpectedData {
                discriminator: "post_not_found".to_string()
            })
        );
        assert_eq!(
            validate_envelope(&json!({ "message": "mystery", "data": { "x": 1 } })),
            Err(ContractViolation::UnknownDiscriminator("mystery".to_string()))
        );
    }

    #[test]
    fn test_unlisted_error_is_other() {
        let response =
            validate_envelope(&json!({ "message": "invalid_password_format", "data": null }))
                .unwrap();
        assert_eq!(
            response,
            Response::Error(ApiError::Other("invalid_password_format".to_string()))
        );
        assert_eq!(response.discriminator(), "invalid_password_format");
    }

    #[test]
    fn test_prose_message_is_not_a_discriminator() {
        for message in [
            "Request did not match any route or mock",
            "Not Found",
            "post-not-found",
            "",
        ] {
            assert_eq!(
                validate_envelope(&json!({ "message": message, "data": null })),
                Err(ContractViolation::UnknownDiscriminator(message.to_string())),
                "{message:?}"
            );
        }
    }

    #[test]
    fn test_not_an_envelope() {
        assert_eq!(validate_envelope(&json!([1, 2])), Err(ContractViolation::NotAnObject));
        assert_eq!(
            validate_envelope(&json!({ "data": null })),
            Err(ContractViolation::MissingMessage)
        );
        assert_eq!(
            validate_envelope(&json!({ "message": 3 })),
            Err(ContractViolation::MissingMessage)
        );
    }

    #[test]
    fn test_success_without_data_is_violation() {
        assert_eq!(
            validate_envelope(&json!({ "message": "create_post_success", "data": null })),
            Err(ContractViolation::MissingData {
                discriminator: "create_post_success".to_string()
            })
        );
    }

    #[test]
    fn test_delete_success_must_not_carry_data() {
        assert_eq!(
            validate_envelope(&json!({ "message": "delete_post_success", "data": null })),
            Ok(Response::DeletePostSuccess)
        );
        assert!(validate_envelope(&json!({
            "message": "delete_comment_success",
            "data": { "comment_id": 1 }
        }))
        .is_err());
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let result = validate_envelope(&json!({
            "message": "like_toggled",
            "data": { "is_liked": "yes", "like_count": 3 }
        }));
        assert!(matches!(result, Err(ContractViolation::Malformed { .. })));
    }

    #[test]
    fn test_posts_items_checked() {
        let result = validate_envelope(&json!({
            "message": "get_posts_success",
            "data": {
                "posts": [
                    { "post_id": 1, "title": "첫 번째 게시글", "content": "내용입니다.", "author_id": 1 },
                    { "post_id": 2, "title": "두 번째 게시글", "content": "두 번째 내용입니다." }
                ],
                "total": 2,
                "page": 1,
                "limit": 10
            }
        }));
        assert_eq!(
            result,
            Err(ContractViolation::MissingItemField {
                discriminator: "get_posts_success".to_string(),
                collection: "posts",
                index: 1,
                field: "author_id",
            })
        );
    }

    #[test]
    fn test_posts_must_be_sequence() {
        let result = validate_envelope(&json!({
            "message": "get_posts_success",
            "data": { "posts": {}, "total": 0, "page": 1, "limit": 10 }
        }));
        assert!(matches!(result, Err(ContractViolation::NotASequence { field: "posts", .. })));
    }

    #[test]
    fn test_comment_sentiment_checked() {
        let ok = validate_envelope(&json!({
            "message": "create_comment_success",
            "data": {
                "comment_id": 1,
                "content": "새 댓글 내용",
                "sentiment": { "label": "neutral", "confidence": 0.8 }
            }
        }))
        .unwrap();
        match ok {
            Response::CreateCommentSuccess(comment) => {
                assert_eq!(comment.sentiment.map(|s| s.confidence), Some(0.8));
            }
            other => panic!("unexpected {other:?}"),
        }

        let bad = validate_envelope(&json!({
            "message": "get_comments_success",
            "data": {
                "comments": [{
                    "comment_id": 1,
                    "content": "테스트 댓글 내용",
                    "author_id": 1,
                    "sentiment": { "label": "ecstatic", "confidence": 0.95 }
                }]
            }
        }));
        assert_eq!(
            bad,
            Err(ContractViolation::InvalidSentimentLabel("ecstatic".to_string()))
        );
    }

    #[test]
    fn test_validate_for_rejects_foreign_discriminator() {
        let body = json!({ "message": "duplicate_email", "data": null });
        assert!(validate_for(Operation::Signup, &body).is_ok());
        assert_eq!(
            validate_for(Operation::Login, &body),
            Err(ContractViolation::WrongOperation {
                operation: "login",
                discriminator: "duplicate_email".to_string(),
            })
        );

        let body = json!({ "message": "view_incremented", "data": { "view_count": 101 } });
        assert!(validate_for(Operation::IncrementView, &body).is_ok());
        assert!(validate_for(Operation::ToggleLike, &body).is_err());
    }

    #[test]
    fn test_serialize_envelope() {
        let response = Response::ViewIncremented(ViewCount { view_count: 101 });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "message": "view_incremented", "data": { "view_count": 101 } })
        );

        let response = Response::Error(ApiError::CommentNotFound);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "message": "comment_not_found", "data": null })
        );
        assert_eq!(response.data(), Value::Null);
    }

    #[test]
    fn test_deserialize_goes_through_catalog() {
        let response: Response =
            serde_json::from_str(r#"{"message":"register_success","data":{"user_id":1}}"#).unwrap();
        assert_eq!(response, Response::RegisterSuccess(RegisterData { user_id: 1 }));

        let err = serde_json::from_str::<Response>(r#"{"message":"register_success","data":{}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("user_id"));
    }
}
