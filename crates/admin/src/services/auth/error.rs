//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    /// No admin session in the request.
    #[error("Sessão não encontrada ou expirada")]
    NoSession,

    /// Password does not meet the length requirement.
    #[error("{0}")]
    WeakPassword(String),

    /// Hashing the password failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
