//! HTTP-level tests for the portfolio site.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`,
//! backed by the in-memory document store, so no database or server is needed.
//!
//! ```bash
//! cargo test -p portfolio-integration-tests
//! ```

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use tower::ServiceExt;
use uuid::Uuid;

use portfolio_core::ProjectId;
use portfolio_site::config::SiteConfig;
use portfolio_site::db::{Collection, Document, DocumentStore, Filter, MemoryDocumentStore, StoreError};
use portfolio_site::services::{BlobError, BlobStore};
use portfolio_site::state::AppState;

/// Username accepted by the development configuration.
pub const ADMIN_USERNAME: &str = "admin";

/// Password accepted in development when no hash is configured.
pub const DEV_PASSWORD: &str = "admin123";

/// Blob store that records uploads instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingBlobStore {
    uploads: Mutex<Vec<(String, String, usize)>>,
}

impl RecordingBlobStore {
    /// `(name, content_type, size)` for every upload so far.
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn put(&self, name: &str, content_type: &str, bytes: Bytes) -> Result<String, BlobError> {
        self.uploads
            .lock()
            .unwrap()
            .push((name.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("https://blob.test/{name}"))
    }
}

/// Document store whose every call fails, as if the database were down.
#[derive(Debug, Default)]
pub struct UnreachableStore;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn count(&self, _: Collection) -> Result<u64, StoreError> {
        Err(down())
    }

    async fn find_all(&self, _: Collection) -> Result<Vec<Document>, StoreError> {
        Err(down())
    }

    async fn find_one(&self, _: Collection, _: &Filter) -> Result<Option<Document>, StoreError> {
        Err(down())
    }

    async fn insert_one(&self, _: Collection, _: Map<String, Value>) -> Result<Uuid, StoreError> {
        Err(down())
    }

    async fn insert_many(
        &self,
        _: Collection,
        _: Vec<Map<String, Value>>,
    ) -> Result<(), StoreError> {
        Err(down())
    }

    async fn seed(&self, _: Collection, _: Vec<Map<String, Value>>) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn insert_sequenced(
        &self,
        _: Collection,
        _: &'static str,
        _: Map<String, Value>,
    ) -> Result<ProjectId, StoreError> {
        Err(down())
    }

    async fn update_one(
        &self,
        _: Collection,
        _: &Filter,
        _: Map<String, Value>,
        _: bool,
    ) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn delete_one(&self, _: Collection, _: &Filter) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

/// A router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub blob: Arc<RecordingBlobStore>,
}

impl TestApp {
    /// Development app over an empty in-memory store with uploads enabled.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryDocumentStore::new()))
    }

    /// Development app over the given store.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let blob = Arc::new(RecordingBlobStore::default());
        let state = AppState::new(
            SiteConfig::development(),
            store,
            Some(blob.clone() as Arc<dyn BlobStore>),
        );
        Self {
            router: portfolio_site::app(state),
            blob,
        }
    }

    /// Development app with no blob store configured.
    pub fn without_uploads() -> Self {
        let state = AppState::new(
            SiteConfig::development(),
            Arc::new(MemoryDocumentStore::new()),
            None,
        );
        Self {
            router: portfolio_site::app(state),
            blob: Arc::new(RecordingBlobStore::default()),
        }
    }

    /// Send one request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Log in with the development credentials and return the `Cookie` header value.
    pub async fn login(&self) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/admin/login",
                &serde_json::json!({ "username": ADMIN_USERNAME, "password": DEV_PASSWORD }),
            ))
            .await;
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Request with no body.
pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Request with a JSON body.
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Attach a session cookie to a request.
pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

/// Multipart upload request with a single `file` field.
pub fn multipart_request(file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    const BOUNDARY: &str = "portfolio-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/admin/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
