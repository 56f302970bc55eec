//! Session-based authentication
//!
//! Wraps the GoTrue endpoints: sign-up, password sign-in, token refresh,
//! sign-out, and password recovery. The session is persisted as JSON in
//! the data directory so the CLI stays signed in between invocations.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::RemoteResult;
use super::RemoteClient;

/// Refresh this long before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 30;

/// The signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    /// Backend-assigned user id (owns all rows)
    pub id: Uuid,
    /// Sign-in email
    pub email: String,
    /// Optional display name
    #[serde(default)]
    pub full_name: Option<String>,
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Bearer token for data requests
    pub access_token: String,
    /// Token used to obtain a fresh access token
    pub refresh_token: String,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
    /// The signed-in user
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token is expired (or about to be)
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS)
    }

    /// Persist the session to disk
    pub fn save(&self, path: &Path) -> RemoteResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a persisted session, `None` if never signed in
    pub fn load(path: &Path) -> RemoteResult<Option<Session>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Remove the persisted session
    pub fn delete(path: &Path) -> RemoteResult<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn test_session(access_token: &str) -> Session {
        Session {
            access_token: access_token.to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user: AuthUser {
                id: Uuid::new_v4(),
                email: "test@example.com".to_string(),
                full_name: None,
            },
        }
    }
}

/// Raw token response from the auth endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let full_name = self
            .user
            .user_metadata
            .get("full_name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
            user: AuthUser {
                id: self.user.id,
                email: self.user.email.unwrap_or_default(),
                full_name,
            },
        }
    }
}

impl RemoteClient {
    /// Sign in with email and password
    pub async fn sign_in(&mut self, email: &str, password: &str) -> RemoteResult<Session> {
        let url = self.auth_url("token?grant_type=password");
        let response = self
            .http()
            .post(&url)
            .header("apikey", self.api_key())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check(response).await?;
        let token: TokenResponse = response.json().await?;
        let session = token.into_session();

        debug!(user = %session.user.id, "signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Create a new account
    ///
    /// Returns `None` when the service requires email confirmation before
    /// the first session is issued.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> RemoteResult<Option<Session>> {
        let url = self.auth_url("signup");
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });

        let response = self
            .http()
            .post(&url)
            .header("apikey", self.api_key())
            .json(&body)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let value: serde_json::Value = response.json().await?;

        // With confirmation enabled the response has a user but no tokens
        if value.get("access_token").is_none() {
            debug!("sign-up accepted, email confirmation pending");
            return Ok(None);
        }

        let token: TokenResponse = serde_json::from_value(value)?;
        let session = token.into_session();
        self.set_session(Some(session.clone()));
        Ok(Some(session))
    }

    /// Exchange the refresh token for a fresh session
    pub async fn refresh_session(&mut self) -> RemoteResult<Session> {
        let refresh_token = self.require_session()?.refresh_token.clone();

        let url = self.auth_url("token?grant_type=refresh_token");
        let response = self
            .http()
            .post(&url)
            .header("apikey", self.api_key())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let response = Self::check(response).await?;
        let token: TokenResponse = response.json().await?;
        let session = token.into_session();

        debug!(user = %session.user.id, "session refreshed");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Sign out, revoking the session server-side
    pub async fn sign_out(&mut self) -> RemoteResult<()> {
        let token = self.require_session()?.access_token.clone();

        let url = self.auth_url("logout");
        let response = self
            .http()
            .post(&url)
            .header("apikey", self.api_key())
            .bearer_auth(&token)
            .send()
            .await?;

        // Revocation failure is not fatal: the local session is dropped anyway
        if let Err(e) = Self::check(response).await {
            warn!("server-side sign-out failed: {}", e);
        }

        self.set_session(None);
        Ok(())
    }

    /// Request a password reset email
    pub async fn reset_password(&self, email: &str) -> RemoteResult<()> {
        let url = self.auth_url("recover");
        let response = self
            .http()
            .post(&url)
            .header("apikey", self.api_key())
            .json(&json!({ "email": email }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
