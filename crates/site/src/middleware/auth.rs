//! Admin access guard and extractors.
//!
//! Every `/admin` page and `/api/admin` endpoint requires a session token,
//! except the two login paths. The token comes from the `adminToken` cookie,
//! or from an `Authorization: Bearer` header for non-browser clients.
//!
//! Rejections:
//! - API paths: 401 `{"error":"Unauthorized"}`
//! - Pages: 302 to `/admin/login`
//!
//! An invalid token additionally clears the cookie.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, LOCATION, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use cookie::{Cookie, SameSite};
use time::Duration;

use crate::error::AppError;
use crate::services::Claims;
use crate::services::auth::SESSION_TTL_SECS;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "adminToken";

/// Admin login page.
pub const LOGIN_PAGE: &str = "/admin/login";

/// Admin login endpoint.
pub const LOGIN_API: &str = "/api/admin/login";

/// Verified admin identity, inserted into request extensions by [`admin_guard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub username: String,
    /// Token expiry (UTC Unix timestamp).
    pub expires_at: i64,
}

impl From<Claims> for AdminSession {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            expires_at: claims.exp,
        }
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Whether `path` belongs to the admin area.
#[must_use]
pub fn is_admin_path(path: &str) -> bool {
    under(path, "/admin") || under(path, "/api/admin")
}

/// Whether `path` requires a session.
#[must_use]
pub fn is_guarded(path: &str) -> bool {
    is_admin_path(path) && !under(path, LOGIN_PAGE) && path != LOGIN_API
}

/// Session token from the cookie, falling back to a bearer header.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
    })
}

/// `Set-Cookie` for a freshly issued session token.
#[must_use]
pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(SESSION_TTL_SECS))
        .path("/")
        .build()
}

/// `Set-Cookie` that removes the session cookie.
#[must_use]
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Append a cookie to a response.
pub fn set_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "Session cookie is not a valid header value"),
    }
}

fn reject(path: &str, clear_cookie: bool) -> Response {
    let mut response = if path.starts_with("/api/") {
        AppError::Unauthorized.into_response()
    } else {
        (StatusCode::FOUND, [(LOCATION, LOGIN_PAGE)]).into_response()
    };
    if clear_cookie {
        set_cookie(&mut response, &clear_session_cookie());
    }
    response
}

/// Guard admin paths, layered with `from_fn_with_state` over the whole router.
pub async fn admin_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !is_guarded(&path) {
        return next.run(request).await;
    }

    let Some(token) = session_token(request.headers()) else {
        tracing::debug!(path = %path, "Admin request without session");
        return reject(&path, false);
    };

    let Some(claims) = state.credentials().verify_token(&token) else {
        tracing::info!(path = %path, "Admin request with invalid session");
        return reject(&path, true);
    };

    request.extensions_mut().insert(AdminSession::from(claims));
    next.run(request).await
}

/// Extractor that requires an admin session.
///
/// Uses the session from [`admin_guard`] when present and otherwise verifies
/// the request's token itself.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminSession);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AdminSession>() {
            return Ok(Self(session.clone()));
        }

        session_token(&parts.headers)
            .and_then(|token| state.credentials().verify_token(&token))
            .map(|claims| Self(AdminSession::from(claims)))
            .ok_or(AppError::Unauthorized)
    }
}
