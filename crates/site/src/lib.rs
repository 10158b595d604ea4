//! Portfolio site library.
//!
//! Serves the public content API and the authenticated admin API. The
//! router is built here so the binary and the HTTP tests run the same stack.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - Document store and repositories
//! - [`services`] - Credentials, session tokens and blob uploads
//! - [`middleware`] - Admin guard and security headers
//! - [`routes`] - HTTP handlers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, middleware as axum_middleware};
use tower_http::services::ServeDir;

use state::AppState;

/// Build the application router with every layer except tracing and Sentry.
pub fn app(state: AppState) -> Router {
    let mut router = routes::routes();

    if let Some(dir) = &state.config().admin_static_dir {
        tracing::info!(dir = %dir.display(), "Serving admin UI assets");
        router = router.nest_service(
            "/admin",
            ServeDir::new(dir).append_index_html_on_directories(true),
        );
    }

    router = router.layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::admin_guard,
    ));

    if !state.config().is_production() {
        router = router.layer(axum_middleware::from_fn(error::expose_error_details));
    }

    router
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .with_state(state)
}
