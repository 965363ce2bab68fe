//! Admin session extractor.
//!
//! [`AdminContext`] hands handlers the tower session together with the live
//! admin session, if any. Expired admin sessions are purged during
//! extraction, so handlers never see one.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use tower_sessions::Session;

use open_bar_core::AdminUserId;

use crate::error::{AppError, set_sentry_user};
use crate::models::AdminSession;
use crate::services::AccessError;
use crate::services::auth::{self, AuthError};

/// The request's session and the logged-in admin.
pub struct AdminContext {
    /// Underlying tower session.
    pub session: Session,
    /// Live admin session, `None` when logged out or expired.
    pub current: Option<AdminSession>,
}

impl AdminContext {
    /// Load the admin session from `session` as of `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn load(session: Session, now: DateTime<Utc>) -> Result<Self, AuthError> {
        let current = auth::current_session(&session, now).await?;
        Ok(Self { session, current })
    }

    /// The acting admin: the session's admin, which `requested` must match
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::Unauthenticated` when logged out and
    /// `AccessError::ActorMismatch` when `requested` is somebody else.
    pub fn actor(&self, requested: Option<AdminUserId>) -> Result<AdminUserId, AccessError> {
        crate::services::acting_admin(requested, self.current.as_ref())
    }
}

impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(message.to_owned()))?;

        let context = Self::load(session, Utc::now()).await?;
        if let Some(current) = &context.current {
            set_sentry_user(current.admin.id.as_i32(), Some(current.admin.email.as_str()));
        }
        Ok(context)
    }
}
