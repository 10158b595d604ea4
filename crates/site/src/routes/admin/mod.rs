//! Admin API handlers.
//!
//! Every handler except login takes [`RequireAdmin`](crate::middleware::RequireAdmin),
//! so it rejects unauthenticated requests even without the guard layer.

pub mod auth;
pub mod company;
pub mod projects;
pub mod skills;
pub mod upload;

use axum::Router;

use super::ReadPolicy;
use crate::state::AppState;

/// Admin reads surface store errors.
pub(crate) const POLICY: ReadPolicy = ReadPolicy::Propagate;

/// Build the admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(projects::router())
        .merge(skills::router())
        .merge(company::router())
        .merge(upload::router())
}
