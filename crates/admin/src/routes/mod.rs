//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (database)
//!
//! POST /functions/admin-auth        - login | logout | session | get_admins |
//!                                     create_admin | update_admin | delete_admin
//! POST /functions/admin-drinks      - list | create | update | delete
//! ```

pub mod admin_auth;
pub mod admin_drinks;

use axum::{Router, routing::post};
use tower_http::cors::CorsLayer;

use crate::middleware::{api_rate_limiter, login_rate_limiter};
use crate::state::AppState;

/// Create all routes for the admin API, without rate limiting.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/functions/admin-auth", post(admin_auth::admin_auth))
        .route("/functions/admin-drinks", post(admin_drinks::admin_drinks))
        .layer(CorsLayer::permissive())
}

/// Create all routes with per-IP rate limits applied.
pub fn rate_limited_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/functions/admin-auth",
            post(admin_auth::admin_auth).layer(login_rate_limiter()),
        )
        .route(
            "/functions/admin-drinks",
            post(admin_drinks::admin_drinks).layer(api_rate_limiter()),
        )
        .layer(CorsLayer::permissive())
}
