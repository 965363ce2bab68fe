//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"success": false, "error": "..."}` so the browser code can treat all
//! endpoints the same way. Server-side failures are captured to Sentry before
//! responding and their details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use open_bar_core::CartError;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;
use crate::services::notion::NotionError;
use crate::services::pix::PixError;
use crate::services::viacep::ViaCepError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Payment gateway call failed.
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] PixError),

    /// Sending email failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Notion API call failed.
    #[error("Notion error: {0}")]
    Notion(#[from] NotionError),

    /// Postal code lookup failed.
    #[error("Address lookup error: {0}")]
    Address(#[from] ViaCepError),

    /// Client input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with the current state.
    #[error("{0}")]
    Conflict(String),

    /// An optional integration is not configured.
    #[error("{0} indisponível")]
    Unavailable(&'static str),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Cart(err) => match err {
                CartError::IndexOutOfRange { .. } | CartError::NotADrink(_) => {
                    StatusCode::BAD_REQUEST
                }
                CartError::Storage(_) | CartError::Serialize(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Email(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Gateway(_) | Self::Email(_) | Self::Notion(_) | Self::Address(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Erro interno do servidor".to_owned()
            }
            Self::Cart(CartError::Storage(_) | CartError::Serialize(_)) => {
                "Não foi possível salvar o carrinho".to_owned()
            }
            Self::Cart(err) => err.to_string(),
            Self::Gateway(err) => err.client_message(),
            Self::Email(err) if err.is_client_error() => err.to_string(),
            Self::Email(_) => "Falha ao enviar email".to_owned(),
            Self::Notion(_) => "Falha ao registrar evento".to_owned(),
            Self::Address(_) => "Falha ao consultar o CEP".to_owned(),
            Self::Validation(msg) | Self::NotFound(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Unavailable(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({ "success": false, "error": self.client_message() });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_owned()),
        message: Some(message.to_owned()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_owned(),
            serde_json::Value::String((*value).to_owned()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
