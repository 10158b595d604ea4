//! Blob storage for uploaded images.
//!
//! Uploads go to Vercel Blob over its HTTP API:
//!
//! - `PUT {api_url}/{pathname}` with the raw bytes as the body
//! - Authentication: `Authorization: Bearer <BLOB_READ_WRITE_TOKEN>`
//! - Response: JSON with the public `url`

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::BlobConfig;

/// Blob API version header value.
const API_VERSION: &str = "7";

/// Filename used when the client sends none, or only unsafe characters.
pub const FALLBACK_FILENAME: &str = "upload";

/// Errors that can occur when uploading a blob.
#[derive(Debug, Error)]
pub enum BlobError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Token was rejected.
    #[error("Unauthorized: invalid blob token")]
    Unauthorized,

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Public-object storage for uploaded files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `name` and return the public URL.
    async fn put(&self, name: &str, content_type: &str, bytes: Bytes) -> Result<String, BlobError>;
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
#[must_use]
pub fn sanitize_filename(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect(),
        _ => FALLBACK_FILENAME.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
}

/// Vercel Blob client.
#[derive(Clone)]
pub struct VercelBlobStore {
    inner: Arc<VercelBlobStoreInner>,
}

struct VercelBlobStoreInner {
    client: reqwest::Client,
    api_url: String,
}

impl VercelBlobStore {
    /// Create a new blob client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &BlobConfig) -> Result<Self, BlobError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.token.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| BlobError::Config(format!("Invalid token format: {e}")))?,
        );
        headers.insert("x-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert("x-add-random-suffix", HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(VercelBlobStoreInner {
                client,
                api_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        })
    }
}

impl std::fmt::Debug for VercelBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VercelBlobStore")
            .field("api_url", &self.inner.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BlobStore for VercelBlobStore {
    async fn put(&self, name: &str, content_type: &str, bytes: Bytes) -> Result<String, BlobError> {
        let url = format!("{}/{name}", self.inner.api_url);
        let size = bytes.len();

        let response = self
            .inner
            .client
            .put(&url)
            .header("x-content-type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body: PutResponse = response.json().await?;
            tracing::info!(name, size, url = %body.url, "Blob uploaded");
            return Ok(body.url);
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(BlobError::Unauthorized);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(BlobError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(Some("photo 1.png")), "photo_1.png");
        assert_eq!(sanitize_filename(Some("../../etc/passwd")), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(Some("ünïcode.jpg")), "_n_code.jpg");
        assert_eq!(sanitize_filename(Some("ok_name-1.webp")), "ok_name-1.webp");
        assert_eq!(sanitize_filename(Some("")), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename(None), FALLBACK_FILENAME);
    }

    #[test]
    fn test_client_debug_hides_token() {
        let store = VercelBlobStore::new(&BlobConfig {
            token: SecretString::from("vercel_blob_rw_secret"),
            api_url: "https://blob.example.com/".to_string(),
        })
        .unwrap();
        let debug = format!("{store:?}");
        assert!(!debug.contains("vercel_blob_rw_secret"));
        assert!(debug.contains("https://blob.example.com\""));
    }
}
