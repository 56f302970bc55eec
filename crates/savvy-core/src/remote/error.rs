//! Remote service error handling
//!
//! Typed errors for the hosted data service, with user-facing messages
//! the UI layer can surface directly.

use thiserror::Error;

/// Errors that can occur talking to the hosted data service
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (DNS, TLS, timeout, connection refused)
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the request
    #[error("Service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Missing or expired session
    #[error("Not signed in or session expired")]
    Unauthorized,

    /// Row or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("Unexpected response from service: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local file access failed (e.g. reading an image to upload)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote service is not configured yet
    #[error("Remote service not configured")]
    NotConfigured,
}

impl RemoteError {
    /// One-line message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Http(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            RemoteError::Api { message, .. } => message.clone(),
            RemoteError::Unauthorized => {
                "You are not signed in. Run `savvy auth login` first.".to_string()
            }
            RemoteError::NotFound(what) => format!("{} was not found.", what),
            RemoteError::Decode(_) => "The server returned an unexpected response.".to_string(),
            RemoteError::Io(e) => format!("Could not read the file: {}", e),
            RemoteError::NotConfigured => {
                "Remote service not configured. Run `savvy config set api_url <url>` and \
                 `savvy config set api_key <key>`."
                    .to_string()
            }
        }
    }

    /// Whether retrying the same request might help
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Http(_) => true,
            RemoteError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;
