//! Admin company handlers.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::Value;

use portfolio_core::{CompanyPatch, CompanyRecord};

use super::POLICY;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::routes::{JsonBody, read_company};
use crate::state::AppState;

/// Build the company router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/company", get(show).put(merge))
}

/// GET /api/admin/company
async fn show(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<CompanyRecord>, AppError> {
    Ok(Json(read_company(&state, POLICY).await?))
}

/// Overwrite the supplied non-null sections; the rest are left as stored.
///
/// PUT /api/admin/company
async fn merge(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, AppError> {
    let patch = CompanyPatch::from_json(&body);
    let record = state.company().merge(&patch).await?;

    tracing::info!(admin = %admin.username, "Company record updated");

    let mut response = record.to_document();
    response.insert(
        "message".to_string(),
        Value::from("Company data updated successfully"),
    );
    Ok(Json(Value::Object(response)))
}
