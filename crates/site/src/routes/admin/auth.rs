//! Admin login and logout.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::middleware::auth::{LOGIN_API, clear_session_cookie, session_cookie, set_cookie};
use crate::routes::JsonBody;
use crate::services::LoginOutcome;
use crate::state::AppState;

/// Where a successful login lands.
pub const ADMIN_HOME: &str = "/admin";

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_API, post(login))
        .route("/api/admin/logout", post(logout))
}

fn credential(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Check credentials and issue the session cookie.
///
/// POST /api/admin/login
async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let (Some(username), Some(password)) = (credential(&body, "username"), credential(&body, "password"))
    else {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    };

    let outcome = state
        .credentials()
        .login(&username, &password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    match outcome {
        LoginOutcome::Success { token } => {
            let mut response = (StatusCode::FOUND, [(LOCATION, ADMIN_HOME)]).into_response();
            set_cookie(
                &mut response,
                &session_cookie(&token, state.config().is_production()),
            );
            Ok(response)
        }
        LoginOutcome::Rejected => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": LoginOutcome::REJECTED_MESSAGE })),
        )
            .into_response()),
    }
}

/// Clear the session cookie.
///
/// POST /api/admin/logout
async fn logout() -> Response {
    let mut response = Json(json!({ "message": "Logged out" })).into_response();
    set_cookie(&mut response, &clear_session_cookie());
    response
}
