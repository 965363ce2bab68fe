//! Password authentication and the admin session.
//!
//! Passwords are stored as argon2id PHC strings with a random salt. A login
//! stores an [`AdminSession`] in the tower session; [`current_session`]
//! drops it again once it is past its expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use tower_sessions::Session;

use open_bar_core::Email;

use crate::db::AdminDirectory;
use crate::models::{AdminSession, session_keys};

/// Minimum password length for admin accounts.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Check a new password against the length requirement.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` for passwords shorter than
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "A senha deve ter pelo menos {MIN_PASSWORD_LENGTH} caracteres"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::warn!(error = %e, "stored password hash is not a PHC string");
        AuthError::InvalidCredentials
    })?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Check `email`/`password` and start a session valid from `now`.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` for a malformed or unknown email
/// and for a wrong password.
#[tracing::instrument(skip(directory, password, now))]
pub async fn login<D: AdminDirectory>(
    directory: &D,
    email: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<AdminSession, AuthError> {
    let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

    let Some((admin, hash)) = directory.find_credentials(&email).await? else {
        tracing::info!("login attempt for unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    verify_password(password, &hash).inspect_err(|_| {
        tracing::info!(admin_id = %admin.id, "login attempt with wrong password");
    })?;

    tracing::info!(admin_id = %admin.id, role = %admin.role, "admin logged in");
    Ok(AdminSession::start(admin, now))
}

/// Store `admin_session` in the tower session, rotating the session id.
///
/// # Errors
///
/// Returns `AuthError::Session` if the session store fails.
pub async fn store_session(session: &Session, admin_session: &AdminSession) -> Result<(), AuthError> {
    session.cycle_id().await?;
    session
        .insert(session_keys::ADMIN_SESSION, admin_session)
        .await?;
    Ok(())
}

/// The live admin session, if any.
///
/// An expired session is removed from the store and reported as absent.
///
/// # Errors
///
/// Returns `AuthError::Session` if the session store fails.
pub async fn current_session(
    session: &Session,
    now: DateTime<Utc>,
) -> Result<Option<AdminSession>, AuthError> {
    let Some(stored) = session
        .get::<AdminSession>(session_keys::ADMIN_SESSION)
        .await?
    else {
        return Ok(None);
    };

    if stored.is_expired(now) {
        tracing::info!(admin_id = %stored.admin.id, "admin session expired");
        session
            .remove::<AdminSession>(session_keys::ADMIN_SESSION)
            .await?;
        return Ok(None);
    }

    Ok(Some(stored))
}

/// End the admin session.
///
/// # Errors
///
/// Returns `AuthError::Session` if the session store fails.
pub async fn logout(session: &Session) -> Result<(), AuthError> {
    session.flush().await?;
    Ok(())
}
