//! Database access for the storefront.
//!
//! The storefront reads the drink catalog maintained by the admin service
//! and stores visitor sessions. It never writes catalog rows.
//!
//! ## Tables
//!
//! - `catalog.drink` - Drink catalog (owned by admin migrations)
//! - `tower_sessions.session` - Visitor sessions (cart, checkout id)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p open-bar-cli -- migrate storefront
//! ```

pub mod drinks;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use drinks::{DrinkFilter, DrinkRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
