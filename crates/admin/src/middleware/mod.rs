//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (propagated or generated)
//! 4. Session layer (tower-sessions, `SameSite=Strict`)
//! 5. Rate limiting (strict on `admin-auth`)
//!
//! Handlers receive the logged-in admin through the [`AdminContext`]
//! extractor.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::AdminContext;
pub use rate_limit::{api_rate_limiter, login_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
