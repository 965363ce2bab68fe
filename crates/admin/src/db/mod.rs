//! Database operations for the admin API.
//!
//! ## Tables
//!
//! - `admin.admin_user` - Admin accounts with argon2 password hashes
//! - `catalog.drink` - Drink catalog (read by the storefront)
//! - `tower_sessions.session` - Sessions, shared with the storefront
//!
//! Services are written against [`AdminDirectory`] and [`DrinkCatalog`] so
//! they can run over the `PostgreSQL` repositories in production and over
//! in-memory stores in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p open-bar-cli -- migrate admin
//! ```

pub mod admin_users;
pub mod drinks;

use std::future::Future;
use std::time::Duration;

use open_bar_core::{AdminUserId, Drink, DrinkDraft, DrinkId, Email};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use drinks::DrinkRepository;

use crate::models::{AdminUser, AdminUserChanges, NewAdminUser};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Unique constraint violation. Carries a message safe to show clients.
    #[error("{0}")]
    Conflict(String),
}

/// Storage for admin accounts.
pub trait AdminDirectory: Send + Sync {
    /// Get an admin by id.
    fn find(
        &self,
        id: AdminUserId,
    ) -> impl Future<Output = Result<Option<AdminUser>, RepositoryError>> + Send;

    /// Get an admin and their password hash by login email.
    fn find_credentials(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(AdminUser, String)>, RepositoryError>> + Send;

    /// List every admin, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<AdminUser>, RepositoryError>> + Send;

    /// Insert a new admin.
    fn create(
        &self,
        admin: &NewAdminUser,
    ) -> impl Future<Output = Result<AdminUser, RepositoryError>> + Send;

    /// Apply `changes` to an admin. `None` when the admin does not exist.
    fn update(
        &self,
        id: AdminUserId,
        changes: &AdminUserChanges,
    ) -> impl Future<Output = Result<Option<AdminUser>, RepositoryError>> + Send;

    /// Delete an admin. `false` when the admin does not exist.
    fn delete(&self, id: AdminUserId) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Storage for the drink catalog.
pub trait DrinkCatalog: Send + Sync {
    /// List every drink ordered by name.
    fn list(&self) -> impl Future<Output = Result<Vec<Drink>, RepositoryError>> + Send;

    /// Insert `drink`.
    fn create(&self, drink: &Drink) -> impl Future<Output = Result<Drink, RepositoryError>> + Send;

    /// Replace the drink `id` with `draft`. `None` when it does not exist.
    fn update(
        &self,
        id: &DrinkId,
        draft: &DrinkDraft,
    ) -> impl Future<Output = Result<Option<Drink>, RepositoryError>> + Send;

    /// Delete a drink. `false` when it does not exist.
    fn delete(&self, id: &DrinkId) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

/// Map unique violations to [`RepositoryError::Conflict`] using `describe`
/// to turn the constraint name into a client message.
pub(crate) fn conflict_or_database(
    err: sqlx::Error,
    describe: impl FnOnce(Option<&str>) -> String,
) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        return RepositoryError::Conflict(describe(db.constraint()));
    }
    RepositoryError::Database(err)
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
