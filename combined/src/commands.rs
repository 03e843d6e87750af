//! Command dispatch over any [`BoardApi`].
//!
//! Local form checks run before a request is built; a failing check returns
//! `AppError::Form` and nothing is sent. The session is only touched by a
//! successful login or account deletion.

use std::path::Path;

use client::{ApiReply, BoardApi, Endpoints, ImageUpload};
use common::{AppError, AppResult};
use contracts::{PageRequest, Response};
use domain::{
    is_valid_image_class, validate_email, validate_nickname, validate_password, CommentDraft,
    CurrentUser, LoginForm, PostDraft, Session, SignupField, SignupForm, DEFAULT_PAGE_LIMIT,
    DEFAULT_PAGE_NUMBER, LOGIN_FAILED, SIGNUP_FAILED,
};
use tracing::{debug, info};

use crate::cli::{
    AccountCommand, Command, CommentsCommand, PostArgs, PostsCommand, SignupArgs, ValidateTarget,
};
use crate::render;

pub struct Harness<'a> {
    api: &'a dyn BoardApi,
    endpoints: Endpoints,
    page_limit: u32,
    local_checks: bool,
}

impl<'a> Harness<'a> {
    pub fn new(api: &'a dyn BoardApi, endpoints: Endpoints) -> Self {
        Self {
            api,
            endpoints,
            page_limit: DEFAULT_PAGE_LIMIT,
            local_checks: true,
        }
    }

    /// Page size for listings that do not give one.
    pub fn page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Send requests even when local checks fail, to exercise backend errors.
    pub fn skip_checks(mut self, skip: bool) -> Self {
        self.local_checks = !skip;
        self
    }

    /// Run one command and return its rendered output.
    pub async fn run(&self, command: Command, session: &mut Session) -> AppResult<String> {
        match command {
            Command::Validate { target } => Ok(validate(target)),
            Command::Login { email, password } => self.login(email, password, session).await,
            Command::Signup(args) => self.signup(args).await,
            Command::Posts { action } => self.posts(action, session).await,
            Command::Comments { action } => self.comments(action, session).await,
            Command::Sentiment { gemini, text } => self.sentiment(gemini, &text).await,
            Command::Account {
                action: AccountCommand::Delete,
            } => self.delete_account(session).await,
            Command::Health => Ok(render::raw(&self.api.health().await?)),
            Command::Endpoints => Ok(self.endpoint_listing()),
            Command::Shell => Err(AppError::bad_request("already in the shell")),
        }
    }

    fn check(&self, result: domain::DomainResult<()>) -> AppResult<()> {
        if self.local_checks {
            result?;
        }
        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    async fn login(
        &self,
        email: String,
        password: String,
        session: &mut Session,
    ) -> AppResult<String> {
        let form = LoginForm { email, password };
        self.check(form.check())?;

        let reply = self.api.login(&form).await?;
        let mut out = render::reply(&reply);

        if let Response::LoginSuccess(data) = &reply.response {
            session.login(CurrentUser {
                user_id: data.user_id,
                nickname: data.nickname.clone(),
                profile_image_url: data.profile_image_url.clone(),
            });
            out.push_str(&format!("\n세션: {}", render::session(session)));
        } else if reply.message().is_none() {
            out.push_str(&format!("\n{LOGIN_FAILED}"));
        }
        Ok(out)
    }

    async fn signup(&self, args: SignupArgs) -> AppResult<String> {
        let mut form = SignupForm {
            password_check: args.password_check.unwrap_or_else(|| args.password.clone()),
            email: args.email,
            password: args.password,
            nickname: args.nickname,
            profile_image_url: args.profile_image_url,
        };
        self.check(form.check(false))?;

        if let Some(path) = &args.profile_image {
            let reply = self.api.upload_profile_image(load_image(path)?).await?;
            match &reply.response {
                Response::UploadSuccess(upload) => {
                    form.profile_image_url = upload.url().map(str::to_string);
                }
                _ => return Ok(render::reply(&reply)),
            }
        }

        let reply = self.api.signup(&form).await?;
        let mut out = render::reply(&reply);
        if !reply.is_success() {
            if reply.message().is_none() {
                out.push_str(&format!("\n{SIGNUP_FAILED}"));
            }
            let field = SignupField::for_discriminator(reply.discriminator());
            out.push_str(&format!("\n필드: {}", field.as_str()));
        }
        Ok(out)
    }

    async fn delete_account(&self, session: &mut Session) -> AppResult<String> {
        let reply = self.api.delete_account(session).await?;
        // Any 2xx means the account is gone, whatever the discriminator
        if (200..300).contains(&reply.status) {
            info!(discriminator = reply.discriminator(), "Account deleted");
            session.clear();
        }
        Ok(render::reply(&reply))
    }

    // =========================================================================
    // Posts
    // =========================================================================

    async fn posts(&self, action: PostsCommand, session: &Session) -> AppResult<String> {
        let reply = match action {
            PostsCommand::List { page, limit } => {
                let page = PageRequest::new(
                    page.unwrap_or(DEFAULT_PAGE_NUMBER),
                    limit.unwrap_or(self.page_limit),
                );
                self.api.list_posts(session, page).await?
            }
            PostsCommand::Get { post_id } => self.api.get_post(session, post_id).await?,
            PostsCommand::Create(args) => {
                let draft = self.post_draft(args, session).await?;
                self.api.create_post(session, &draft).await?
            }
            PostsCommand::Update { post_id, post } => {
                let draft = self.post_draft(post, session).await?;
                self.api.update_post(session, post_id, &draft).await?
            }
            PostsCommand::Delete { post_id } => self.api.delete_post(session, post_id).await?,
            PostsCommand::Like { post_id } => self.api.toggle_like(session, post_id).await?,
            PostsCommand::View { post_id } => self.api.increment_view(session, post_id).await?,
            PostsCommand::Upload { path } => {
                self.api
                    .upload_post_image(session, load_image(&path)?)
                    .await?
            }
        };
        Ok(render::reply(&reply))
    }

    /// Build and check a draft, uploading its image first when one is given.
    async fn post_draft(&self, args: PostArgs, session: &Session) -> AppResult<PostDraft> {
        let mut draft = PostDraft::new(args.title, args.content);
        if let Some(url) = args.image_url {
            draft = draft.with_image(url, args.image_class.clone());
        }
        self.check(draft.check())?;

        if let Some(path) = &args.image {
            let reply = self
                .api
                .upload_post_image(session, load_image(path)?)
                .await?;
            let upload = match &reply.response {
                Response::UploadSuccess(upload) => upload,
                _ => return Err(upload_failed(&reply)),
            };

            let url = upload
                .url()
                .ok_or_else(|| AppError::internal("upload reply without an image URL"))?;
            let class = args
                .image_class
                .or_else(|| upload.class_name().map(str::to_string))
                .filter(|class| is_valid_image_class(class));
            debug!(url, class = class.as_deref(), "Attaching uploaded image");
            draft = draft.with_image(url, class);
        }
        Ok(draft)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    async fn comments(&self, action: CommentsCommand, session: &Session) -> AppResult<String> {
        let reply = match action {
            CommentsCommand::List { post_id } => self.api.list_comments(session, post_id).await?,
            CommentsCommand::Create { post_id, content } => {
                let draft = CommentDraft::new(content);
                self.check(draft.check())?;
                self.api.create_comment(session, post_id, &draft).await?
            }
            CommentsCommand::Update {
                post_id,
                comment_id,
                content,
            } => {
                let draft = CommentDraft::new(content);
                self.check(draft.check())?;
                self.api
                    .update_comment(session, post_id, comment_id, &draft)
                    .await?
            }
            CommentsCommand::Delete {
                post_id,
                comment_id,
            } => {
                self.api
                    .delete_comment(session, post_id, comment_id)
                    .await?
            }
        };
        Ok(render::reply(&reply))
    }

    // =========================================================================
    // Model API and misc
    // =========================================================================

    async fn sentiment(&self, gemini: bool, text: &str) -> AppResult<String> {
        if self.local_checks && text.trim().is_empty() {
            return Err(AppError::validation("분석할 텍스트를 입력해주세요"));
        }
        let reply = if gemini {
            self.api.analyze_sentiment_gemini(text).await?
        } else {
            self.api.analyze_sentiment(text).await?
        };
        Ok(render::raw(&reply))
    }

    fn endpoint_listing(&self) -> String {
        self.endpoints
            .listing()
            .into_iter()
            .map(|(label, url)| format!("{label:<26} {url}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn validate(target: ValidateTarget) -> String {
    match target {
        ValidateTarget::Email { value } => {
            let verdict = if validate_email(Some(&value)) {
                "valid"
            } else {
                "invalid"
            };
            format!("email: {verdict}")
        }
        ValidateTarget::Password { value } => {
            render::validation("password", &validate_password(&value))
        }
        ValidateTarget::Nickname { value } => {
            render::validation("nickname", &validate_nickname(&value))
        }
    }
}

fn load_image(path: &Path) -> AppResult<ImageUpload> {
    let image = ImageUpload::from_path(path)?;
    image.check()?;
    Ok(image)
}

fn upload_failed(reply: &ApiReply) -> AppError {
    AppError::bad_request(format!(
        "image upload failed: {}",
        render::reply(reply)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::MockBoardApi;
    use contracts::{ApiError, LoginData, PostPage, PostRef};
    use domain::FieldErrors;

    fn signup_args(password: &str) -> SignupArgs {
        SignupArgs {
            email: "testuser@example.com".to_string(),
            password: password.to_string(),
            password_check: None,
            nickname: "테스트유저".to_string(),
            profile_image: None,
            profile_image_url: None,
        }
    }

    fn logged_in() -> Session {
        Session::for_user(CurrentUser {
            user_id: 1,
            nickname: "테스트유저".to_string(),
            profile_image_url: None,
        })
    }

    fn form_errors(result: AppResult<String>) -> FieldErrors {
        match result {
            Err(AppError::Form(fields)) => fields,
            other => panic!("expected form error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_with_short_password_never_calls_backend() {
        // No expectations: any call panics
        let api = MockBoardApi::new();
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = Session::anonymous();

        let result = harness
            .run(Command::Signup(signup_args("short")), &mut session)
            .await;

        let fields = form_errors(result);
        assert!(fields.get("password").iter().any(|m| m.contains("8자")));
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_signup_failure_is_routed_to_field() {
        let mut api = MockBoardApi::new();
        api.expect_signup()
            .withf(|form| form.password_check == form.password)
            .times(1)
            .returning(|_| Ok(ApiReply::new(409, Response::Error(ApiError::DuplicateEmail))));
        let harness = Harness::new(&api, Endpoints::default());

        let out = harness
            .run(Command::Signup(signup_args("Password1!")), &mut Session::anonymous())
            .await
            .unwrap();

        assert!(out.contains("중복된 이메일입니다"));
        assert!(out.ends_with("필드: email"));
    }

    #[tokio::test]
    async fn test_unlisted_signup_error_falls_back_to_generic_text() {
        let mut api = MockBoardApi::new();
        api.expect_signup()
            .times(1)
            .returning(|_| Ok(ApiReply::new(400, Response::Error(ApiError::Other("rate_limited".into())))));
        let harness = Harness::new(&api, Endpoints::default());

        let out = harness
            .run(Command::Signup(signup_args("Password1!")), &mut Session::anonymous())
            .await
            .unwrap();
        assert!(out.contains(SIGNUP_FAILED));
        assert!(out.ends_with("필드: general"));
    }

    #[tokio::test]
    async fn test_login_success_starts_session() {
        let mut api = MockBoardApi::new();
        api.expect_login()
            .withf(|form| form.email == "testuser@example.com")
            .times(1)
            .returning(|_| {
                Ok(ApiReply::new(
                    200,
                    Response::LoginSuccess(LoginData {
                        user_id: 7,
                        nickname: "테스트유저".to_string(),
                        profile_image_url: None,
                    }),
                ))
            });
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = Session::anonymous();

        let login = Command::Login {
            email: "testuser@example.com".to_string(),
            password: "TestPassword123!@#".to_string(),
        };
        let out = harness.run(login, &mut session).await.unwrap();

        assert_eq!(session.current_user().map(|u| u.user_id), Some(7));
        assert!(out.contains("세션: 테스트유저 (user_id 7)"));
    }

    #[tokio::test]
    async fn test_unlisted_login_error_falls_back_to_generic_text() {
        let mut api = MockBoardApi::new();
        api.expect_login().returning(|_| {
            Ok(ApiReply::new(
                400,
                Response::Error(ApiError::Other("account_locked".into())),
            ))
        });
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = Session::anonymous();

        let login = Command::Login {
            email: "testuser@example.com".to_string(),
            password: "TestPassword123!@#".to_string(),
        };
        let out = harness.run(login, &mut session).await.unwrap();

        assert!(out.starts_with("[400] account_locked"));
        assert!(out.ends_with(LOGIN_FAILED));
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_login_failure_keeps_session_empty() {
        let mut api = MockBoardApi::new();
        api.expect_login()
            .returning(|_| Ok(ApiReply::new(401, Response::Error(ApiError::InvalidCredentials))));
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = Session::anonymous();

        let login = Command::Login {
            email: "testuser@example.com".to_string(),
            password: "Wrong1!pass".to_string(),
        };
        let out = harness.run(login, &mut session).await.unwrap();

        assert!(out.contains("아이디 또는 비밀번호를 확인해주세요"));
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_malformed_login_email_is_rejected_locally() {
        let api = MockBoardApi::new();
        let harness = Harness::new(&api, Endpoints::default());

        let login = Command::Login {
            email: "missing@domain".to_string(),
            password: "Password1!".to_string(),
        };
        let fields = form_errors(harness.run(login, &mut Session::anonymous()).await);
        assert_eq!(fields.get("email"), ["올바른 이메일 주소 형식을 입력해주세요"]);
    }

    #[tokio::test]
    async fn test_account_delete_clears_session() {
        let mut api = MockBoardApi::new();
        api.expect_delete_account()
            .times(1)
            .returning(|_| Ok(ApiReply::new(200, Response::DeleteUserSuccess)));
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = logged_in();

        let delete = Command::Account {
            action: AccountCommand::Delete,
        };
        harness.run(delete, &mut session).await.unwrap();

        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_account_delete_clears_session_on_any_ok_status() {
        let mut api = MockBoardApi::new();
        api.expect_delete_account().times(1).returning(|_| {
            Ok(ApiReply::new(
                200,
                Response::Error(ApiError::Other("user_deleted".into())),
            ))
        });
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = logged_in();

        let delete = Command::Account {
            action: AccountCommand::Delete,
        };
        harness.run(delete, &mut session).await.unwrap();

        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn test_rejected_account_delete_keeps_session() {
        let mut api = MockBoardApi::new();
        api.expect_delete_account()
            .times(1)
            .returning(|_| Ok(ApiReply::new(401, Response::Error(ApiError::Unauthorized))));
        let harness = Harness::new(&api, Endpoints::default());
        let mut session = logged_in();

        let delete = Command::Account {
            action: AccountCommand::Delete,
        };
        harness.run(delete, &mut session).await.unwrap();

        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn test_blank_post_title_is_rejected_locally() {
        let api = MockBoardApi::new();
        let harness = Harness::new(&api, Endpoints::default());

        let create = Command::Posts {
            action: PostsCommand::Create(PostArgs {
                title: "  ".to_string(),
                content: "내용입니다.".to_string(),
                image: None,
                image_url: None,
                image_class: None,
            }),
        };
        let fields = form_errors(harness.run(create, &mut logged_in()).await);
        assert_eq!(fields.get("title"), ["제목을 입력해주세요"]);
    }

    #[tokio::test]
    async fn test_create_post_with_image_url() {
        let mut api = MockBoardApi::new();
        api.expect_create_post()
            .withf(|session, draft| {
                session.is_logged_in()
                    && draft.image_url.as_deref() == Some("http://localhost:8000/uploads/a.png")
                    && draft.image_class.as_deref() == Some("Cat")
            })
            .times(1)
            .returning(|_, _| {
                Ok(ApiReply::new(
                    201,
                    Response::CreatePostSuccess(PostRef { post_id: 12 }),
                ))
            });
        let harness = Harness::new(&api, Endpoints::default());

        let create = Command::Posts {
            action: PostsCommand::Create(PostArgs {
                title: "고양이 사진".to_string(),
                content: "귀엽죠".to_string(),
                image: None,
                image_url: Some("http://localhost:8000/uploads/a.png".to_string()),
                image_class: Some("Cat".to_string()),
            }),
        };
        let out = harness.run(create, &mut logged_in()).await.unwrap();
        assert!(out.starts_with("[201] create_post_success"));
    }

    #[tokio::test]
    async fn test_skip_checks_lets_backend_reject() {
        let mut api = MockBoardApi::new();
        api.expect_create_comment()
            .withf(|_, post_id, draft| *post_id == 1 && draft.content.is_empty())
            .times(1)
            .returning(|_, _, _| {
                Ok(ApiReply::new(400, Response::Error(ApiError::ContentRequired)))
            });
        let harness = Harness::new(&api, Endpoints::default()).skip_checks(true);

        let create = Command::Comments {
            action: CommentsCommand::Create {
                post_id: 1,
                content: String::new(),
            },
        };
        let out = harness.run(create, &mut logged_in()).await.unwrap();
        assert_eq!(out, "[400] content_required - 내용을 입력해주세요");
    }

    #[tokio::test]
    async fn test_list_uses_configured_page_limit() {
        let mut api = MockBoardApi::new();
        api.expect_list_posts()
            .withf(|_, page| page.page() == 1 && page.limit() == 20)
            .times(1)
            .returning(|_, page| {
                Ok(ApiReply::new(
                    200,
                    Response::GetPostsSuccess(PostPage {
                        posts: vec![],
                        total: 45,
                        page: page.page(),
                        limit: page.limit(),
                    }),
                ))
            });
        let harness = Harness::new(&api, Endpoints::default()).page_limit(20);

        let list = Command::Posts {
            action: PostsCommand::List {
                page: None,
                limit: None,
            },
        };
        let out = harness.run(list, &mut Session::anonymous()).await.unwrap();
        assert!(out.contains("페이지 1/3 (총 45개)"));
    }

    #[tokio::test]
    async fn test_validate_password_lists_rules() {
        let api = MockBoardApi::new();
        let harness = Harness::new(&api, Endpoints::default());

        let validate = Command::Validate {
            target: ValidateTarget::Password {
                value: "password1!".to_string(),
            },
        };
        let out = harness.run(validate, &mut Session::anonymous()).await.unwrap();
        assert_eq!(out, "password: invalid\n  - 대문자가 필요합니다");
    }

    #[tokio::test]
    async fn test_endpoints_listing() {
        let api = MockBoardApi::new();
        let harness = Harness::new(&api, Endpoints::default());

        let out = harness
            .run(Command::Endpoints, &mut Session::anonymous())
            .await
            .unwrap();
        assert!(out.contains("http://localhost:8000/api/posts?page=1&limit=10"));
        assert!(out.contains("http://localhost:8001/api/sentiment/gemini"));
    }
}
