//! Cloudinary upload client
//!
//! Forwards in-memory image payloads to the Cloudinary upload API and
//! returns the durable URL Cloudinary assigns. Requests are signed with
//! the account's API secret (SHA-1 over the sorted parameter string).
//!
//! The client is stateless: every call is a single signed POST with no
//! retries, and concurrent invocations are independent.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::config::CloudinaryConfig;
use crate::core::error::AppError;

const UPLOAD_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// An image file carried in a multipart request, held fully in memory.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Result of a successful upload. Only the URL is persisted; the public id
/// exists so a failed database write can trigger a best-effort destroy.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadApiResponse {
    secure_url: String,
    public_id: String,
}

/// Cloudinary upload client
pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http_client: Client,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Whether all three credentials are configured
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    fn credentials(&self) -> Option<(&str, &str, &str)> {
        match (
            self.config.cloud_name.as_deref(),
            self.config.api_key.as_deref(),
            self.config.api_secret.as_deref(),
        ) {
            (Some(cloud), Some(key), Some(secret)) => Some((cloud, key, secret)),
            _ => None,
        }
    }

    /// Upload an image payload, returning the durable URL and public id.
    ///
    /// Single attempt: any network error or provider rejection surfaces as
    /// `AppError::Upload` and the caller must not persist anything for it.
    pub async fn upload(&self, payload: &ImagePayload) -> Result<UploadedImage, AppError> {
        let (cloud_name, api_key, api_secret) = self.credentials().ok_or_else(|| {
            AppError::Upload("Cloudinary credentials are not configured".to_string())
        })?;

        if payload.data.is_empty() {
            return Err(AppError::Upload(format!(
                "Empty file payload for '{}'",
                payload.filename
            )));
        }

        let public_id = format!("catalog/{}", Uuid::new_v4());
        let timestamp = unix_timestamp();
        let signature = sign_params(
            &[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            api_secret,
        );

        let file_part = Part::bytes(payload.data.clone())
            .file_name(payload.filename.clone())
            .mime_str(&payload.content_type)
            .map_err(|e| AppError::Upload(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .part("file", file_part)
            .text("api_key", api_key.to_string())
            .text("public_id", public_id.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let url = format!("{}/{}/image/upload", UPLOAD_API_BASE, cloud_name);
        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upload(format!(
                "Cloudinary rejected upload: {} - {}",
                status, body
            )));
        }

        let parsed: UploadApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upload(format!("Invalid upload response: {}", e)))?;

        debug!(
            "Uploaded '{}' as public_id={}",
            payload.filename, parsed.public_id
        );

        Ok(UploadedImage {
            url: parsed.secure_url,
            public_id: parsed.public_id,
        })
    }

    /// Best-effort destroy of an uploaded image.
    ///
    /// Used only for orphan cleanup when the database write fails after a
    /// successful upload; failures are logged, never propagated.
    pub async fn destroy(&self, public_id: &str) {
        let Some((cloud_name, api_key, api_secret)) = self.credentials() else {
            return;
        };

        let timestamp = unix_timestamp();
        let signature = sign_params(
            &[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
            ],
            api_secret,
        );

        let form = Form::new()
            .text("public_id", public_id.to_string())
            .text("api_key", api_key.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let url = format!("{}/{}/image/destroy", UPLOAD_API_BASE, cloud_name);
        match self.http_client.post(&url).multipart(form).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Destroyed orphaned upload public_id={}", public_id);
            }
            Ok(response) => {
                warn!(
                    "Cloudinary destroy for '{}' returned status {}",
                    public_id,
                    response.status()
                );
            }
            Err(e) => {
                warn!("Cloudinary destroy for '{}' failed: {}", public_id, e);
            }
        }
    }
}

fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Cloudinary request signature: SHA-1 hex digest of the parameters sorted
/// by key, joined as `k=v` with `&`, with the API secret appended.
fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_is_deterministic() {
        let a = sign_params(&[("public_id", "sample"), ("timestamp", "1315060510")], "abcd");
        let b = sign_params(&[("public_id", "sample"), ("timestamp", "1315060510")], "abcd");
        assert_eq!(a, b);
        // SHA-1 hex digest is always 40 characters
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_params_sorts_keys() {
        let forward = sign_params(&[("public_id", "x"), ("timestamp", "1")], "secret");
        let reversed = sign_params(&[("timestamp", "1"), ("public_id", "x")], "secret");
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_sign_params_depends_on_secret() {
        let a = sign_params(&[("timestamp", "1")], "secret-a");
        let b = sign_params(&[("timestamp", "1")], "secret-b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_unconfigured_client_is_reported() {
        let client = CloudinaryClient::new(CloudinaryConfig {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            request_timeout_secs: 30,
        })
        .unwrap();
        assert!(!client.is_configured());
    }
}
