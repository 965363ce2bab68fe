//! Session middleware configuration for admin.
//!
//! Admin sessions live in the same `PostgreSQL` table as storefront sessions
//! but use their own cookie, `SameSite=Strict`, and a 24-hour inactivity
//! expiry. The login itself carries an absolute 24-hour expiry as well, see
//! [`AdminSession`](crate::models::AdminSession).

use sqlx::PgPool;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;
use crate::models::session::SESSION_TTL_HOURS;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "ob_admin_session";

/// Create the session layer with the `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer(PostgresStore::new(pool.clone()), config.is_https())
}

/// Configure an admin session layer over any store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_TTL_HOURS)))
        .with_secure(secure)
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
