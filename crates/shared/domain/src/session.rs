//! Logged-in user context.
//!
//! The session is an explicit value owned by whoever drives the harness and
//! lent to each request. It is set on login and cleared on logout or account
//! deletion; nothing else mutates it.

use serde::{Deserialize, Serialize};
use tracing::info;

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: i64,
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

/// Current session, empty until a login succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<CurrentUser>,
}

impl Session {
    /// An anonymous session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session already bound to a user.
    pub fn for_user(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    /// Value of the user id header, if logged in.
    pub fn user_id_header(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.user_id.to_string())
    }

    /// Record a successful login, replacing any previous user.
    pub fn login(&mut self, user: CurrentUser) {
        info!(user_id = user.user_id, nickname = %user.nickname, "Session started");
        self.user = Some(user);
    }

    /// End the session (logout or account deletion).
    pub fn clear(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user_id = user.user_id, "Session cleared");
        }
    }
}
