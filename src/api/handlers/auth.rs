//! Session proxy handlers

use crate::api::handlers::AppState;
use crate::api::models::MessageResponse;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

/// Cookies the frontend stores a session under
const SESSION_COOKIES: [&str; 3] = ["user", "auth_token", "session"];

/// Handler for POST /api/auth/logout - clear session cookies and forward the logout
///
/// The cookie expirations ride on every response. The body reports success
/// unless the forwarded call failed in transport; whatever status the backend
/// answers with is logged and otherwise ignored.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    for name in SESSION_COOKIES {
        if let Ok(value) = HeaderValue::from_str(&format!("{}=; Path=/; Max-Age=0", name)) {
            headers.append(header::SET_COOKIE, value);
        }
    }

    let (status, message) = match state.backend.logout().await {
        Ok(()) => (StatusCode::OK, "Logged out successfully"),
        Err(err) => {
            tracing::error!(error = %err, "Logout forwarding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Logout failed")
        }
    };

    (status, headers, Json(MessageResponse::new(message)))
}
