//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{AbacatePayClient, CheckoutService, EmailService, NotionClient, ViaCepClient};

/// Checkout orchestrator as wired in production.
pub type Checkout = CheckoutService<AbacatePayClient, Option<EmailService>>;

/// Error building an integration client at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("payment gateway: {0}")]
    Gateway(#[from] crate::services::pix::PixError),
    #[error("SMTP: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Notion: {0}")]
    Notion(#[from] crate::services::notion::NotionError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Optional integrations are `None` when their
/// configuration is absent; handlers needing them answer 503.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    checkout: Option<Checkout>,
    email: Option<EmailService>,
    notion: Option<NotionClient>,
    viacep: ViaCepClient,
}

impl AppState {
    /// Create the application state, building every configured client.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured integration cannot be initialized.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let email = config.email.as_ref().map(EmailService::new).transpose()?;
        let checkout = config
            .abacatepay
            .as_ref()
            .map(|gateway| {
                AbacatePayClient::new(gateway).map(|client| {
                    CheckoutService::new(client, email.clone(), gateway.pix_expires_in)
                })
            })
            .transpose()?;
        let notion = config.notion.as_ref().map(NotionClient::new).transpose()?;
        let viacep = ViaCepClient::new(&config.viacep_base_url);

        if checkout.is_none() {
            tracing::warn!("ABACATEPAY_API_KEY not set, PIX checkout disabled");
        }
        if email.is_none() {
            tracing::warn!("SMTP_HOST not set, email functions disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                checkout,
                email,
                notion,
                viacep,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// PIX checkout, if a gateway is configured.
    #[must_use]
    pub fn checkout(&self) -> Option<&Checkout> {
        self.inner.checkout.as_ref()
    }

    /// Email delivery, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Notion CRM, if configured.
    #[must_use]
    pub fn notion(&self) -> Option<&NotionClient> {
        self.inner.notion.as_ref()
    }

    /// Postal code lookup.
    #[must_use]
    pub fn viacep(&self) -> &ViaCepClient {
        &self.inner.viacep
    }
}
