//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Store reachability
//!
//! # Public (no auth, seed data when the store is down)
//! GET  /api/public/company          - Company record
//! GET  /api/public/projects         - { projects }
//! GET  /api/public/skills           - { categories }
//!
//! # Admin (session token required except for login)
//! POST /api/admin/login             - Issue session cookie, 302 to /admin
//! POST /api/admin/logout            - Clear session cookie
//! GET  /api/admin/projects          - { projects }
//! POST /api/admin/projects          - Create project
//! GET  /api/admin/projects/{id}     - { project }
//! PUT  /api/admin/projects/{id}     - Replace project
//! DELETE /api/admin/projects/{id}   - Delete project
//! GET  /api/admin/skills            - { categories }
//! PUT  /api/admin/skills            - Replace all categories
//! GET  /api/admin/company           - Company record
//! PUT  /api/admin/company           - Merge company sections
//! POST /api/admin/upload            - Upload an image
//! ```

pub mod admin;
pub mod health;
pub mod public;

use axum::{
    Json, Router,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use portfolio_core::seed::{default_company, default_projects, default_skills};
use portfolio_core::{CompanyRecord, Project, SkillCategory};

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::state::AppState;

/// Error message for request bodies that are not valid JSON.
pub const INVALID_JSON: &str = "Invalid JSON in request body";

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(public::router())
        .merge(admin::router())
}

/// What a read does when the store fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Log and serve the static seed data.
    StaticFallback,
    /// Surface the error to the client.
    Propagate,
}

impl ReadPolicy {
    /// Resolve a repository read under this policy.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` under [`ReadPolicy::Propagate`].
    pub fn resolve<T>(
        self,
        result: Result<T, RepositoryError>,
        fallback: impl FnOnce() -> T,
    ) -> Result<T, AppError> {
        match (self, result) {
            (_, Ok(value)) => Ok(value),
            (Self::StaticFallback, Err(e)) => {
                tracing::warn!(error = %e, "Store read failed; serving static content");
                Ok(fallback())
            }
            (Self::Propagate, Err(e)) => Err(e.into()),
        }
    }
}

pub(crate) async fn read_projects(
    state: &AppState,
    policy: ReadPolicy,
) -> Result<Vec<Project>, AppError> {
    policy.resolve(state.projects().list().await, default_projects)
}

pub(crate) async fn read_skills(
    state: &AppState,
    policy: ReadPolicy,
) -> Result<Vec<SkillCategory>, AppError> {
    policy.resolve(state.skills().get().await, default_skills)
}

pub(crate) async fn read_company(
    state: &AppState,
    policy: ReadPolicy,
) -> Result<CompanyRecord, AppError> {
    policy.resolve(state.company().get().await, default_company)
}

/// JSON request body whose rejection is a 400 `{"error": INVALID_JSON}`.
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(AppError::Validation(INVALID_JSON.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::StoreError;

    fn down() -> Result<Vec<u8>, RepositoryError> {
        Err(RepositoryError::Store(StoreError::Unavailable("down".into())))
    }

    #[test]
    fn test_static_fallback_serves_fallback() {
        let value = ReadPolicy::StaticFallback.resolve(down(), || vec![1, 2]).unwrap();
        assert_eq!(value, vec![1, 2]);
    }

    #[test]
    fn test_propagate_surfaces_error() {
        let result = ReadPolicy::Propagate.resolve(down(), Vec::new);
        assert!(matches!(result, Err(AppError::Store(_))));
    }

    #[test]
    fn test_success_ignores_policy() {
        for policy in [ReadPolicy::StaticFallback, ReadPolicy::Propagate] {
            assert_eq!(policy.resolve(Ok(vec![7]), Vec::new).unwrap(), vec![7]);
        }
    }
}
