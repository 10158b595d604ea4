//! Admin project handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use portfolio_core::{ProjectInput, ProjectRef};

use super::POLICY;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::routes::{JsonBody, read_projects};
use crate::state::AppState;

const NOT_FOUND: &str = "Project not found";

/// Build the projects router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/projects", get(list).post(create))
        .route(
            "/api/admin/projects/{id}",
            get(show).put(update).delete(destroy),
        )
}

fn validate(body: &Value) -> Result<ProjectInput, AppError> {
    ProjectInput::from_json(body).map_err(|e| AppError::Validation(e.to_string()))
}

/// GET /api/admin/projects
async fn list(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let projects = read_projects(&state, POLICY).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// POST /api/admin/projects
async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = validate(&body)?;
    let project = state.projects().create(input).await?;

    tracing::info!(admin = %admin.username, id = %project.id, "Project created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Project created successfully", "project": project })),
    ))
}

/// GET /api/admin/projects/{id}
async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let project = state
        .projects()
        .get(&ProjectRef::parse(&id))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Json(json!({ "project": project })))
}

/// PUT /api/admin/projects/{id}
async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, AppError> {
    let input = validate(&body)?;
    let project = state
        .projects()
        .update(&ProjectRef::parse(&id), input)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(admin = %admin.username, id = %project.id, "Project updated");
    Ok(Json(json!({ "message": "Project updated successfully", "project": project })))
}

/// DELETE /api/admin/projects/{id}
async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let project_ref = ProjectRef::parse(&id);
    if !state.projects().delete(&project_ref).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }

    tracing::info!(admin = %admin.username, %project_ref, "Project deleted");
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}
