//! Harness configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use domain::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::{Deserialize, Serialize};

/// Backend origin; the REST API lives under `/api`
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Model API base (sentiment analysis)
pub const DEFAULT_MODEL_API_URL: &str = "http://localhost:8001/api";

/// Request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Backend origin, without the `/api` suffix
    pub backend_url: String,
    /// Model API base URL
    pub model_api_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Page size used when a listing does not give one
    pub default_page_limit: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            model_api_url: DEFAULT_MODEL_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            backend_url: var("BACKEND_URL")
                .map(|url| trim_url(&url))
                .unwrap_or(defaults.backend_url),
            model_api_url: var("MODEL_API_URL")
                .map(|url| trim_url(&url))
                .unwrap_or(defaults.model_api_url),
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.request_timeout_secs),
            default_page_limit: var("DEFAULT_PAGE_LIMIT")
                .and_then(|v| v.parse::<u32>().ok())
                .map(|limit| limit.clamp(1, MAX_PAGE_LIMIT))
                .unwrap_or(defaults.default_page_limit),
        }
    }

    /// Base URL of the REST API.
    pub fn api_base_url(&self) -> String {
        format!("{}/api", self.backend_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
