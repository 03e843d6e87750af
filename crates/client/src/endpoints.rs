//! URL builder for every backend and model API route.

use common::HarnessConfig;
use contracts::PageRequest;

/// Base URLs the harness talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    origin: String,
    api: String,
    model: String,
}

impl Endpoints {
    /// `origin` is the backend root (`http://localhost:8000`); the REST API is
    /// served under `{origin}/api`.
    pub fn new(origin: impl Into<String>, model: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        let api = format!("{origin}/api");
        Self {
            origin,
            api,
            model: model.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(&config.backend_url, &config.model_api_url)
    }

    pub fn api_base(&self) -> &str {
        &self.api
    }

    pub fn model_base(&self) -> &str {
        &self.model
    }

    // Auth

    pub fn login(&self) -> String {
        format!("{}/auth/login", self.api)
    }

    pub fn signup(&self) -> String {
        format!("{}/auth/signup", self.api)
    }

    // Users

    pub fn profile_upload(&self) -> String {
        format!("{}/users/profile/upload", self.api)
    }

    /// `DELETE` here removes the caller's account.
    pub fn profile(&self) -> String {
        format!("{}/users/profile", self.api)
    }

    // Posts

    /// Listing URL without a query string.
    pub fn posts_root(&self) -> String {
        format!("{}/posts", self.api)
    }

    pub fn posts(&self, page: PageRequest) -> String {
        format!(
            "{}/posts?page={}&limit={}",
            self.api,
            page.page(),
            page.limit()
        )
    }

    pub fn post(&self, post_id: i64) -> String {
        format!("{}/posts/{}", self.api, post_id)
    }

    pub fn post_like(&self, post_id: i64) -> String {
        format!("{}/posts/{}/like", self.api, post_id)
    }

    pub fn post_view(&self, post_id: i64) -> String {
        format!("{}/posts/{}/view", self.api, post_id)
    }

    pub fn post_upload(&self) -> String {
        format!("{}/posts/upload", self.api)
    }

    // Comments

    pub fn comments(&self, post_id: i64) -> String {
        format!("{}/posts/{}/comments", self.api, post_id)
    }

    pub fn comment(&self, post_id: i64, comment_id: i64) -> String {
        format!("{}/posts/{}/comments/{}", self.api, post_id, comment_id)
    }

    // Model API

    pub fn sentiment(&self) -> String {
        format!("{}/sentiment", self.model)
    }

    pub fn sentiment_gemini(&self) -> String {
        format!("{}/sentiment/gemini", self.model)
    }

    /// Backend health check, served at the origin root.
    pub fn health(&self) -> String {
        format!("{}/", self.origin)
    }

    /// Every route, labelled, for display.
    pub fn listing(&self) -> Vec<(&'static str, String)> {
        vec![
            ("POST   login", self.login()),
            ("POST   signup", self.signup()),
            ("POST   profile upload", self.profile_upload()),
            ("DELETE account", self.profile()),
            ("GET    posts", self.posts(PageRequest::default())),
            ("GET    post", self.post(1)),
            ("POST   post", self.posts_root()),
            ("PATCH  post", self.post(1)),
            ("DELETE post", self.post(1)),
            ("POST   like", self.post_like(1)),
            ("PATCH  view", self.post_view(1)),
            ("POST   post upload", self.post_upload()),
            ("GET    comments", self.comments(1)),
            ("POST   comment", self.comments(1)),
            ("PATCH  comment", self.comment(1, 1)),
            ("DELETE comment", self.comment(1, 1)),
            ("POST   sentiment", self.sentiment()),
            ("POST   sentiment (gemini)", self.sentiment_gemini()),
            ("GET    health", self.health()),
        ]
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_config(&HarnessConfig::default())
    }
}
