//! Public content API.
//!
//! Always answers 200: when the store is unavailable the static seed content
//! is served instead.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};

use portfolio_core::CompanyRecord;

use super::{ReadPolicy, read_company, read_projects, read_skills};
use crate::error::AppError;
use crate::state::AppState;

const POLICY: ReadPolicy = ReadPolicy::StaticFallback;

/// Build the public router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/public/company", get(company))
        .route("/api/public/projects", get(projects))
        .route("/api/public/skills", get(skills))
}

/// GET /api/public/company
async fn company(State(state): State<AppState>) -> Result<Json<CompanyRecord>, AppError> {
    Ok(Json(read_company(&state, POLICY).await?))
}

/// GET /api/public/projects
async fn projects(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let projects = read_projects(&state, POLICY).await?;
    Ok(Json(json!({ "projects": projects })))
}

/// GET /api/public/skills
async fn skills(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let categories = read_skills(&state, POLICY).await?;
    Ok(Json(json!({ "categories": categories })))
}
