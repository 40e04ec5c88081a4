use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::middleware::session::session_token;
use crate::AppState;

/// Lets the request through only when its session has logged in as admin.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(&jar) else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error":"missing_session"})),
        )
            .into_response();
    };
    let Some(session) = state.sessions.get(&token).await else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error":"unknown_session"})),
        )
            .into_response();
    };
    if !session.is_admin {
        return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"}))).into_response();
    }
    next.run(req).await
}

/// Constant-time password check. No configured password means no admin.
pub fn password_matches(expected: Option<&str>, given: &str) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}
