//! API routes

use crate::api::handlers::{logout, proxy_cover, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Build the portal's API routes
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        // Session proxy
        .route("/api/auth/logout", post(logout))
        // Remote-image proxy
        .route("/api/proxy/cover", get(proxy_cover))
        .with_state(state)
}
