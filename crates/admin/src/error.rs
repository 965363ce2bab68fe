//! Unified error handling for the admin API.
//!
//! Errors render as `{"success": false, "error": "..."}`. Server-side
//! failures are captured to Sentry and replaced by a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AccessError, AdminUserError, AuthError, CatalogError};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error(transparent)]
    Database(#[from] RepositoryError),

    /// Login or session failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Authorization failure.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Admin account management failure.
    #[error(transparent)]
    AdminUser(#[from] AdminUserError),

    /// Catalog editing failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Auth(AuthError::Session(err))
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err)
            | Self::Auth(AuthError::Repository(err))
            | Self::Access(AccessError::Repository(err))
            | Self::AdminUser(AdminUserError::Repository(err))
            | Self::Catalog(CatalogError::Repository(err)) => repository_status(err),
            Self::Auth(AuthError::InvalidCredentials | AuthError::NoSession)
            | Self::Access(AccessError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::WeakPassword(_))
            | Self::AdminUser(
                AdminUserError::Invalid(_)
                | AdminUserError::SelfDemotion
                | AdminUserError::SelfDeletion,
            )
            | Self::Catalog(CatalogError::Invalid(_) | CatalogError::MissingId)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Access(
                AccessError::UnknownAdmin
                | AccessError::ActorMismatch
                | AccessError::Denied { .. },
            ) => StatusCode::FORBIDDEN,
            Self::AdminUser(AdminUserError::NotFound(_))
            | Self::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Auth(AuthError::PasswordHash | AuthError::Session(_))
            | Self::AdminUser(AdminUserError::Auth(_))
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
            "Erro interno do servidor".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use open_bar_core::{AdminRole, AdminUserId, DrinkError, Permission};

    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Auth(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (AppError::Access(AccessError::UnknownAdmin), StatusCode::FORBIDDEN),
            (AppError::Access(AccessError::ActorMismatch), StatusCode::FORBIDDEN),
            (AppError::Access(AccessError::Unauthenticated), StatusCode::UNAUTHORIZED),
            (
                AppError::Access(AccessError::Denied {
                    role: AdminRole::Viewer,
                    permission: Permission::EditCatalog,
                }),
                StatusCode::FORBIDDEN,
            ),
            (AppError::AdminUser(AdminUserError::SelfDemotion), StatusCode::BAD_REQUEST),
            (
                AppError::AdminUser(AdminUserError::NotFound(AdminUserId::new(3))),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::AdminUser(AdminUserError::Repository(RepositoryError::Conflict(
                    "Email já cadastrado".into(),
                ))),
                StatusCode::CONFLICT,
            ),
            (
                AppError::Catalog(CatalogError::Invalid(DrinkError::MissingName)),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[tokio::test]
    async fn test_body_hides_internal_details() {
        let response = AppError::Database(RepositoryError::DataCorruption(
            "invalid CPF in database".into(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Erro interno do servidor");
    }

    #[tokio::test]
    async fn test_conflict_message_is_shown() {
        let response =
            AppError::Database(RepositoryError::Conflict("CPF já cadastrado".into())).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "CPF já cadastrado");
    }
}
