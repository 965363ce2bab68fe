//! Database migrations.
//!
//! Migrations are embedded at compile time from each crate's `migrations/`
//! directory. Both sets can target the same database: versions do not
//! overlap, and each run ignores versions applied by the other set.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront database (falls back to `DATABASE_URL`)
//! - `ADMIN_DATABASE_URL` - admin database (falls back to `DATABASE_URL`)

use open_bar_core::config::{ConfigError, database_url};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Database URL is not configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails or
/// a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    run(
        "storefront",
        "STOREFRONT_DATABASE_URL",
        sqlx::migrate!("../storefront/migrations"),
    )
    .await
}

/// Run admin migrations (admin accounts and the drink catalog).
///
/// # Errors
///
/// Returns `MigrationError` if the URL is missing, the connection fails or
/// a migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    run("admin", "ADMIN_DATABASE_URL", sqlx::migrate!("../admin/migrations")).await
}

async fn run(name: &str, url_key: &str, mut migrator: Migrator) -> Result<(), MigrationError> {
    let url = database_url(url_key)?;

    tracing::info!(database = name, "connecting to database");
    let pool = PgPool::connect(url.expose_secret()).await?;

    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!(
        database = name,
        count = migrator.iter().count(),
        "migrations up to date"
    );
    Ok(())
}
