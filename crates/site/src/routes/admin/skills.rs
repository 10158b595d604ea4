//! Admin skills handlers.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use portfolio_core::types::skill::parse_categories;

use super::POLICY;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::routes::{JsonBody, read_skills};
use crate::state::AppState;

/// Build the skills router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/skills", get(show).put(replace))
}

/// GET /api/admin/skills
async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let categories = read_skills(&state, POLICY).await?;
    Ok(Json(json!({ "categories": categories })))
}

/// PUT /api/admin/skills
async fn replace(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, AppError> {
    let categories = parse_categories(body.get("categories").unwrap_or(&Value::Null))
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let categories = state.skills().replace(categories).await?;

    tracing::info!(admin = %admin.username, "Skills updated");
    Ok(Json(json!({
        "message": "Skills updated successfully",
        "categories": categories,
    })))
}
