//! Image uploads to the storage bucket
//!
//! Shared images are uploaded under `<user_id>/<millis>-<suffix>.<ext>` and
//! referenced by their public URL. Uploads retry up to 3 attempts with a
//! 1 second pause, matching the app's fixed policy.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::{RemoteError, RemoteResult};
use super::RemoteClient;

/// Fixed number of upload attempts
const UPLOAD_ATTEMPTS: u32 = 3;

/// Pause between attempts
const RETRY_PAUSE: Duration = Duration::from_secs(1);

impl RemoteClient {
    /// Upload a local image file to the bucket
    ///
    /// Returns the public URL of the stored object.
    pub async fn upload_image(&self, path: &Path) -> RemoteResult<String> {
        let user_id = self.require_session()?.user.id;

        let bytes = std::fs::read(path)?;
        let ext = extension_of(path);
        let key = object_key(user_id, &ext);
        let content_type = content_type_for(&ext);
        let url = self.storage_url(&key);

        debug!(key, bucket = self.bucket_name(), size = bytes.len(), "uploading image");

        with_retry(RETRY_PAUSE, || {
            self.try_upload(&url, bytes.clone(), content_type)
        })
        .await?;
        Ok(self.public_url(&key))
    }

    async fn try_upload(
        &self,
        url: &str,
        bytes: Vec<u8>,
        content_type: &'static str,
    ) -> RemoteResult<()> {
        let response = self
            .http()
            .post(url)
            .header("apikey", self.api_key())
            .bearer_auth(self.bearer())
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

/// Run an upload attempt up to `UPLOAD_ATTEMPTS` times, pausing between
/// failures. The last error is surfaced when every attempt fails.
async fn with_retry<F, Fut>(pause: Duration, mut op: F) -> RemoteResult<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = RemoteResult<()>>,
{
    let mut last_err = None;
    for attempt in 1..=UPLOAD_ATTEMPTS {
        match op().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!(attempt, "upload failed: {}", e);
                last_err = Some(e);
                if attempt < UPLOAD_ATTEMPTS {
                    tokio::time::sleep(pause).await;
                }
            }
        }
    }

    Err(last_err.unwrap_or(RemoteError::Api {
        status: 0,
        message: "upload failed".to_string(),
    }))
}

/// Lowercased file extension, defaulting to "jpg"
fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}

/// Object key: `<user_id>/<millis>-<suffix>.<ext>`
fn object_key(user_id: Uuid, ext: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}-{}.{}",
        user_id,
        Utc::now().timestamp_millis(),
        &suffix[..7],
        ext
    )
}

/// Content type guessed from the extension
fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(&PathBuf::from("/tmp/photo.PNG")), "png");
        assert_eq!(extension_of(&PathBuf::from("/tmp/photo.jpeg")), "jpeg");
        // No extension falls back to jpg
        assert_eq!(extension_of(&PathBuf::from("/tmp/photo")), "jpg");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("webp"), "image/webp");
        assert_eq!(content_type_for("bin"), "application/octet-stream");
    }

    #[test]
    fn test_object_key_shape() {
        let user_id = Uuid::new_v4();
        let key = object_key(user_id, "png");

        let (prefix, file) = key.split_once('/').unwrap();
        assert_eq!(prefix, user_id.to_string());
        assert!(file.ends_with(".png"));

        // <millis>-<suffix> stem
        let stem = file.strip_suffix(".png").unwrap();
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 7);
    }

    #[test]
    fn test_object_keys_are_unique() {
        let user_id = Uuid::new_v4();
        let a = object_key(user_id, "jpg");
        let b = object_key(user_id, "jpg");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_upload_stops_after_three_attempts() {
        let attempts = Cell::new(0u32);

        let result = with_retry(Duration::ZERO, || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                Err(RemoteError::Api {
                    status: 503,
                    message: format!("attempt {} failed", n),
                })
            }
        })
        .await;

        assert_eq!(attempts.get(), UPLOAD_ATTEMPTS);
        match result.unwrap_err() {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 503);
                // The final attempt's error is the one surfaced
                assert_eq!(message, "attempt 3 failed");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_stops_retrying_on_success() {
        let attempts = Cell::new(0u32);

        let result = with_retry(Duration::ZERO, || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                if n < 2 {
                    Err(RemoteError::Api {
                        status: 500,
                        message: "transient".to_string(),
                    })
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(attempts.get(), 2);
    }
}
