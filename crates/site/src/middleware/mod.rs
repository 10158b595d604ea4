//! HTTP middleware for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers
//! 4. Error details (development only)
//! 5. Admin guard (session token on `/admin` and `/api/admin`)

pub mod auth;
pub mod security_headers;

pub use auth::{
    AdminSession, RequireAdmin, SESSION_COOKIE, admin_guard, clear_session_cookie,
    session_cookie,
};
pub use security_headers::security_headers_middleware;
