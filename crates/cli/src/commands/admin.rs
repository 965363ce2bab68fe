//! Admin account commands.
//!
//! The admin API only lets a manager create accounts, so the first manager
//! is created here.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for the admin database
//! - `OPEN_BAR_ADMIN_PASSWORD` - initial password, when `--password` is omitted

use open_bar_admin::db::{AdminDirectory, AdminUserRepository, RepositoryError};
use open_bar_admin::models::AdminUserData;
use open_bar_admin::services::admin_users::{self, AdminUserError};
use open_bar_core::config::{ConfigError, database_url};
use open_bar_core::{AdminRole, AdminUserId};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database URL is not configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// The account data was rejected.
    #[error("Invalid admin account: {0}")]
    Invalid(#[from] AdminUserError),

    /// Insert failed, including a duplicate email or CPF.
    #[error("Could not create admin: {0}")]
    Repository(#[from] RepositoryError),
}

/// Arguments for `admin create`.
pub struct CreateAdmin {
    pub email: String,
    pub full_name: String,
    pub cpf: String,
    pub role: AdminRole,
    pub password: SecretString,
}

impl CreateAdmin {
    fn into_data(self) -> AdminUserData {
        AdminUserData {
            nome_completo: Some(self.full_name),
            cpf: Some(self.cpf),
            email: Some(self.email),
            role: Some(self.role),
            password: Some(self.password.expose_secret().to_owned()),
        }
    }
}

/// Create an admin account.
///
/// Input goes through the same validation as the admin API: CPF check
/// digits, email shape and minimum password length.
///
/// # Errors
///
/// Returns `AdminError` for invalid input, a missing database URL, a
/// connection failure or a duplicate email or CPF.
pub async fn create_user(request: CreateAdmin) -> Result<AdminUserId, AdminError> {
    let new_admin = admin_users::validate_new(request.into_data())?;

    let url = database_url("ADMIN_DATABASE_URL")?;
    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(url.expose_secret()).await?;

    let admin = AdminUserRepository::new(&pool).create(&new_admin).await?;

    tracing::info!(
        id = %admin.id,
        email = %admin.email,
        role = %admin.role,
        "admin account created"
    );
    Ok(admin.id)
}
