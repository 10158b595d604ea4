//! Unified error handling for the site.
//!
//! Every error renders as JSON `{ "error": <message> }`. Server errors carry
//! their underlying cause as an [`ErrorDetails`] response extension, which
//! [`expose_error_details`] folds into the body as `details` outside
//! production.

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::BlobError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body or parameters failed validation.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Store operation failed.
    #[error("Database error: {0}")]
    Store(#[from] RepositoryError),

    /// Uploaded file was refused.
    #[error("{0}")]
    UploadRejected(String),

    /// Upload target is not configured.
    #[error("File storage is not configured")]
    UploadUnavailable,

    /// Blob storage failed.
    #[error("Upload error: {0}")]
    Upload(#[from] BlobError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Cause of a server error, attached to the response for [`expose_error_details`].
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub error: String,
    pub details: String,
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UploadRejected(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::UploadUnavailable | Self::Upload(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Server errors never leak their cause here.
    fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Upload(BlobError::Unauthorized) => "Invalid blob storage token".to_string(),
            Self::Upload(_) => "Failed to upload file".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.public_message();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if status.is_server_error() {
            response.extensions_mut().insert(ErrorDetails {
                error: message,
                details: self.to_string(),
            });
        }
        response
    }
}

/// Add `details` to server error bodies. Only layered outside production.
pub async fn expose_error_details(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let Some(ErrorDetails { error, details }) = response.extensions_mut().remove::<ErrorDetails>()
    else {
        return response;
    };

    let body = json!({ "error": error, "details": details }).to_string();
    response.headers_mut().remove(CONTENT_LENGTH);
    *response.body_mut() = Body::from(body);
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;
    use axum::{Router, middleware, routing::get};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::db::StoreError;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn store_down() -> AppError {
        AppError::Store(RepositoryError::Store(StoreError::Unavailable(
            "connection refused".to_string(),
        )))
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(get_status(AppError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::UploadRejected("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(store_down()), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            get_status(AppError::UploadUnavailable),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_client_errors_use_their_message() {
        let body = body_json(AppError::NotFound("Project not found".into()).into_response()).await;
        assert_eq!(body, json!({ "error": "Project not found" }));
    }

    #[tokio::test]
    async fn test_server_errors_hide_cause() {
        let body = body_json(store_down().into_response()).await;
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_details_middleware_adds_cause() {
        let app = Router::new()
            .route("/fail", get(|| async { Err::<(), _>(store_down()) }))
            .route(
                "/missing",
                get(|| async { Err::<(), _>(AppError::NotFound("nope".into())) }),
            )
            .layer(middleware::from_fn(expose_error_details));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body["details"].as_str().unwrap().contains("connection refused"));

        let response = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({ "error": "nope" }));
    }
}
