//! Client for the hosted data service
//!
//! The backend is a Supabase-style stack consumed as three opaque services:
//! - GoTrue session auth (`/auth/v1/...`)
//! - PostgREST table CRUD with row-level ownership (`/rest/v1/...`)
//! - object storage for uploaded images (`/storage/v1/...`)
//!
//! The client is a thin pass-through: build the request, check the status,
//! decode the rows. No retry policy beyond the fixed image upload loop.

pub mod auth;
pub mod bucket;
pub mod error;
pub mod tables;

pub use auth::{AuthUser, Session};
pub use error::{RemoteError, RemoteResult};

use std::time::Duration;

use crate::config::Config;

/// Request timeout in seconds
const REQUEST_TIMEOUT: u64 = 10;

/// HTTP client for the hosted data service
///
/// Carries the base URL, the public API key, and the current session
/// (if signed in). Cheap to clone the config out of; the inner reqwest
/// client pools connections.
#[derive(Debug)]
pub struct RemoteClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    bucket: String,
    session: Option<Session>,
}

impl RemoteClient {
    /// Create a client from configuration
    ///
    /// Fails with `NotConfigured` when the API URL or key is missing.
    pub fn new(config: &Config) -> RemoteResult<Self> {
        if !config.is_configured() {
            return Err(RemoteError::NotConfigured);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(concat!("savvy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            bucket: config.bucket.clone(),
            session: None,
        })
    }

    /// The current session, if signed in
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Replace the current session
    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    /// Get the session or fail with `Unauthorized`
    pub(crate) fn require_session(&self) -> RemoteResult<&Session> {
        self.session.as_ref().ok_or(RemoteError::Unauthorized)
    }

    /// Bearer token for requests: session token when signed in, anon key otherwise
    pub(crate) fn bearer(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .unwrap_or(&self.api_key)
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn bucket_name(&self) -> &str {
        &self.bucket
    }

    /// Base URL for a REST table, e.g. `.../rest/v1/links`
    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.api_url, table)
    }

    /// URL for an auth endpoint, e.g. `.../auth/v1/token`
    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.api_url, path)
    }

    /// URL for a storage object
    pub(crate) fn storage_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.api_url, self.bucket, key)
    }

    /// Public URL for a stored object
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.api_url, self.bucket, key
        )
    }

    /// Map a non-success response to a typed error
    pub(crate) async fn check(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RemoteError::Unauthorized);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.to_string());
        Err(RemoteError::Api {
            status: status.as_u16(),
            message: truncate_message(&message),
        })
    }
}

/// PostgREST equality filter, e.g. `id=eq.<uuid>`
pub(crate) fn eq_filter(column: &str, value: &str) -> String {
    format!("{}=eq.{}", column, value)
}

/// Keep error bodies short enough for a one-line message
fn truncate_message(message: &str) -> String {
    let message = message.trim();
    if message.chars().count() <= 200 {
        message.to_string()
    } else {
        let cut: String = message.chars().take(197).collect();
        format!("{}...", cut)
    }
}
