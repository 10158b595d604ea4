//! Admin image upload.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::post,
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::services::blob::sanitize_filename;
use crate::state::AppState;

/// Largest accepted image (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit: the image plus multipart framing.
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 64 * 1024;

const FIELD_NAME: &str = "file";
const TOO_LARGE: &str = "File is too large. Maximum size is 5MB.";

/// Build the upload router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/upload", post(upload))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

fn multipart_error(e: &MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadRejected(TOO_LARGE.to_string())
    } else {
        AppError::UploadRejected(format!("Invalid upload: {}", e.body_text()))
    }
}

/// POST /api/admin/upload
async fn upload(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let Some(blob) = state.blob() else {
        return Err(AppError::UploadUnavailable);
    };

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }
        // A part without a filename is a plain form value, not a file
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            break;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
        file = Some((file_name, content_type, bytes));
        break;
    }

    let Some((file_name, content_type, bytes)) = file else {
        return Err(AppError::UploadRejected("No file uploaded".to_string()));
    };
    if !content_type.starts_with("image/") {
        return Err(AppError::UploadRejected(
            "Only image uploads are allowed".to_string(),
        ));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::UploadRejected(TOO_LARGE.to_string()));
    }

    let name = sanitize_filename(Some(&file_name));
    let size = bytes.len();
    let url = blob.put(&name, &content_type, bytes).await?;

    tracing::info!(admin = %admin.username, name = %name, size, "Image uploaded");
    Ok(Json(json!({ "message": "File uploaded successfully", "url": url })))
}
