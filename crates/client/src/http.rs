//! `reqwest` implementation of [`BoardApi`].

use std::time::Duration;

use async_trait::async_trait;
use common::{AppError, AppResult, HarnessConfig};
use contracts::{validate_envelope, ContractViolation, Operation, PageRequest};
use domain::{
    CommentDraft, DomainError, LoginForm, PostDraft, Session, SignupForm, UPLOAD_FIELD_NAME,
    USER_ID_HEADER,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ApiReply, BoardApi, ImageUpload, RawReply};
use crate::endpoints::Endpoints;

/// Body of both sentiment endpoints.
#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    text: &'a str,
    explain: bool,
}

/// HTTP client for the board backend and the model API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &HarnessConfig) -> AppResult<Self> {
        Self::with_endpoints(Endpoints::from_config(config), config.request_timeout())
    }

    /// Create a client for explicit endpoints.
    pub fn with_endpoints(endpoints: Endpoints, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    // =========================================================================
    // Request building
    // =========================================================================

    /// Start a request, attaching the user id header when logged in.
    fn request(&self, method: Method, url: &str, session: &Session) -> RequestBuilder {
        debug!(%method, url, authenticated = session.is_logged_in(), "Sending request");

        let builder = self.http.request(method, url);
        match session.user_id_header() {
            Some(user_id) => builder.header(USER_ID_HEADER, user_id),
            None => builder,
        }
    }

    fn require_login(session: &Session, operation: Operation) -> AppResult<()> {
        if session.is_logged_in() {
            Ok(())
        } else {
            warn!(operation = operation.name(), "Refusing call without a session");
            Err(DomainError::LoginRequired.into())
        }
    }

    fn upload_form(image: ImageUpload) -> AppResult<Form> {
        image.check()?;

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)
            .map_err(|e| AppError::bad_request(format!("invalid MIME type: {e}")))?;

        Ok(Form::new().part(UPLOAD_FIELD_NAME, part))
    }

    // =========================================================================
    // Response handling
    // =========================================================================

    /// Send an envelope request and check the reply against the catalog.
    async fn send(&self, operation: Operation, builder: RequestBuilder) -> AppResult<ApiReply> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if status.is_server_error() {
            warn!(status = status.as_u16(), operation = operation.name(), "Server error");
            return Err(AppError::transport(Some(status.as_u16()), body));
        }

        let value: Value = serde_json::from_str(&body).map_err(|_| {
            warn!(status = status.as_u16(), operation = operation.name(), "Non-JSON reply");
            AppError::transport(Some(status.as_u16()), body.clone())
        })?;

        let response = match validate_envelope(&value) {
            Ok(response) => response,
            // A router or proxy answered, not the backend
            Err(_) if status.is_client_error() => {
                return Err(AppError::transport(Some(status.as_u16()), body));
            }
            Err(violation) => return Err(violation.into()),
        };

        // Errors may come from shared middleware; a success must be this call's
        if let Some(answered) = response.operation() {
            if answered != operation {
                warn!(
                    operation = operation.name(),
                    discriminator = response.discriminator(),
                    "Reply belongs to another operation"
                );
                return Err(ContractViolation::WrongOperation {
                    operation: operation.name(),
                    discriminator: response.discriminator().to_string(),
                }
                .into());
            }
        }

        debug!(
            status = status.as_u16(),
            discriminator = response.discriminator(),
            "Reply accepted"
        );
        Ok(ApiReply::new(status.as_u16(), response))
    }

    /// Send a request whose reply is outside the envelope contract.
    async fn send_raw(&self, builder: RequestBuilder) -> AppResult<RawReply> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        let body = serde_json::from_str(&body).unwrap_or(Value::String(body));
        Ok(RawReply { status, body })
    }

    async fn analyze(&self, url: &str, text: &str) -> AppResult<RawReply> {
        let request = self
            .request(Method::POST, url, &Session::anonymous())
            .json(&SentimentRequest {
                text,
                explain: false,
            });
        self.send_raw(request).await
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    warn!(error = %err, "Request failed");
    AppError::transport(err.status().map(|s| s.as_u16()), err.to_string())
}

#[async_trait]
impl BoardApi for ApiClient {
    async fn login(&self, form: &LoginForm) -> AppResult<ApiReply> {
        let request = self
            .request(Method::POST, &self.endpoints.login(), &Session::anonymous())
            .json(form);
        self.send(Operation::Login, request).await
    }

    async fn signup(&self, form: &SignupForm) -> AppResult<ApiReply> {
        let request = self
            .request(Method::POST, &self.endpoints.signup(), &Session::anonymous())
            .json(form);
        self.send(Operation::Signup, request).await
    }

    async fn upload_profile_image(&self, image: ImageUpload) -> AppResult<ApiReply> {
        let form = Self::upload_form(image)?;
        let request = self
            .request(Method::POST, &self.endpoints.profile_upload(), &Session::anonymous())
            .multipart(form);
        self.send(Operation::UploadImage, request).await
    }

    async fn delete_account(&self, session: &Session) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::DeleteAccount)?;
        let request = self.request(Method::DELETE, &self.endpoints.profile(), session);
        self.send(Operation::DeleteAccount, request).await
    }

    async fn list_posts(&self, session: &Session, page: PageRequest) -> AppResult<ApiReply> {
        let request = self
            .request(Method::GET, &self.endpoints.posts_root(), session)
            .query(&page.query());
        self.send(Operation::ListPosts, request).await
    }

    async fn get_post(&self, session: &Session, post_id: i64) -> AppResult<ApiReply> {
        let request = self.request(Method::GET, &self.endpoints.post(post_id), session);
        self.send(Operation::GetPost, request).await
    }

    async fn create_post(&self, session: &Session, draft: &PostDraft) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::CreatePost)?;
        let request = self
            .request(Method::POST, &self.endpoints.posts_root(), session)
            .json(draft);
        self.send(Operation::CreatePost, request).await
    }

    async fn update_post(
        &self,
        session: &Session,
        post_id: i64,
        draft: &PostDraft,
    ) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::UpdatePost)?;
        let request = self
            .request(Method::PATCH, &self.endpoints.post(post_id), session)
            .json(draft);
        self.send(Operation::UpdatePost, request).await
    }

    async fn delete_post(&self, session: &Session, post_id: i64) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::DeletePost)?;
        let request = self.request(Method::DELETE, &self.endpoints.post(post_id), session);
        self.send(Operation::DeletePost, request).await
    }

    async fn toggle_like(&self, session: &Session, post_id: i64) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::ToggleLike)?;
        let request = self.request(Method::POST, &self.endpoints.post_like(post_id), session);
        self.send(Operation::ToggleLike, request).await
    }

    async fn increment_view(&self, session: &Session, post_id: i64) -> AppResult<ApiReply> {
        let request = self.request(Method::PATCH, &self.endpoints.post_view(post_id), session);
        self.send(Operation::IncrementView, request).await
    }

    async fn upload_post_image(
        &self,
        session: &Session,
        image: ImageUpload,
    ) -> AppResult<ApiReply> {
        let form = Self::upload_form(image)?;
        let request = self
            .request(Method::POST, &self.endpoints.post_upload(), session)
            .multipart(form);
        self.send(Operation::UploadImage, request).await
    }

    async fn list_comments(&self, session: &Session, post_id: i64) -> AppResult<ApiReply> {
        let request = self.request(Method::GET, &self.endpoints.comments(post_id), session);
        self.send(Operation::ListComments, request).await
    }

    async fn create_comment(
        &self,
        session: &Session,
        post_id: i64,
        draft: &CommentDraft,
    ) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::CreateComment)?;
        let request = self
            .request(Method::POST, &self.endpoints.comments(post_id), session)
            .json(draft);
        self.send(Operation::CreateComment, request).await
    }

    async fn update_comment(
        &self,
        session: &Session,
        post_id: i64,
        comment_id: i64,
        draft: &CommentDraft,
    ) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::UpdateComment)?;
        let request = self
            .request(
                Method::PATCH,
                &self.endpoints.comment(post_id, comment_id),
                session,
            )
            .json(draft);
        self.send(Operation::UpdateComment, request).await
    }

    async fn delete_comment(
        &self,
        session: &Session,
        post_id: i64,
        comment_id: i64,
    ) -> AppResult<ApiReply> {
        Self::require_login(session, Operation::DeleteComment)?;
        let request = self.request(
            Method::DELETE,
            &self.endpoints.comment(post_id, comment_id),
            session,
        );
        self.send(Operation::DeleteComment, request).await
    }

    async fn analyze_sentiment(&self, text: &str) -> AppResult<RawReply> {
        self.analyze(&self.endpoints.sentiment(), text).await
    }

    async fn analyze_sentiment_gemini(&self, text: &str) -> AppResult<RawReply> {
        self.analyze(&self.endpoints.sentiment_gemini(), text).await
    }

    async fn health(&self) -> AppResult<RawReply> {
        let request = self.request(Method::GET, &self.endpoints.health(), &Session::anonymous());
        self.send_raw(request).await
    }
}
