//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL of the site (used for gateway return links)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `ABACATEPAY_API_KEY` - Payment gateway key; PIX checkout is disabled without it
//! - `ABACATEPAY_BASE_URL` - Gateway API root (default: <https://api.abacatepay.com/v1>)
//! - `PIX_EXPIRES_IN_SECONDS` - Lifetime of a PIX QR code (default: 3600)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` - Outgoing mail;
//!   email functions answer 503 when `SMTP_HOST` is unset
//! - `OPERATOR_EMAIL` - Inbox that receives quotes, orders and visit notices
//! - `NOTION_API_KEY`, `NOTION_DATABASE_ID` - Event CRM; disabled when unset
//! - `VIACEP_BASE_URL` - Postal code API root (default: <https://viacep.com.br/ws>)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};

use open_bar_core::config::{
    ConfigError, database_url, env_or_default, optional_env, optional_validated_secret,
    parse_env, required_env,
};
use secrecy::SecretString;

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// PIX gateway, absent when no API key is configured
    pub abacatepay: Option<AbacatePayConfig>,
    /// Outgoing email, absent when no SMTP host is configured
    pub email: Option<EmailConfig>,
    /// Notion CRM, absent when no key is configured
    pub notion: Option<NotionConfig>,
    /// ViaCEP API root
    pub viacep_base_url: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Payment gateway configuration.
#[derive(Clone)]
pub struct AbacatePayConfig {
    pub api_key: SecretString,
    pub base_url: String,
    /// Lifetime of generated PIX codes, in seconds
    pub pix_expires_in: u32,
}

impl std::fmt::Debug for AbacatePayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbacatePayConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("pix_expires_in", &self.pix_expires_in)
            .finish()
    }
}

/// Email (SMTP) configuration.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// Sender address (From header)
    pub from_address: String,
    /// Operator inbox for quotes, orders and visit notices
    pub operator_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("operator_address", &self.operator_address)
            .finish()
    }
}

/// Notion integration configuration.
#[derive(Clone)]
pub struct NotionConfig {
    pub api_key: SecretString,
    pub database_id: String,
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("api_key", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env` first when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        open_bar_core::config::load_dotenv();

        Ok(Self {
            database_url: database_url("STOREFRONT_DATABASE_URL")?,
            host: parse_env("STOREFRONT_HOST", "127.0.0.1")?,
            port: parse_env("STOREFRONT_PORT", "3000")?,
            base_url: base_url("STOREFRONT_BASE_URL")?,
            abacatepay: AbacatePayConfig::from_env()?,
            email: EmailConfig::from_env()?,
            notion: NotionConfig::from_env()?,
            viacep_base_url: env_or_default("VIACEP_BASE_URL", "https://viacep.com.br/ws"),
            sentry_dsn: optional_env("SENTRY_DSN"),
            sentry_environment: optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.1")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Read a public base URL, requiring an absolute http(s) URL.
fn base_url(key: &str) -> Result<String, ConfigError> {
    let raw = required_env(key)?;
    let url = url::Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "must be an http(s) URL".to_owned(),
        ));
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

impl AbacatePayConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = optional_validated_secret("ABACATEPAY_API_KEY")? else {
            return Ok(None);
        };
        Ok(Some(Self {
            api_key,
            base_url: env_or_default("ABACATEPAY_BASE_URL", "https://api.abacatepay.com/v1"),
            pix_expires_in: parse_env("PIX_EXPIRES_IN_SECONDS", "3600")?,
        }))
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = optional_env("SMTP_HOST") else {
            return Ok(None);
        };
        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_env("SMTP_PORT", "587")?,
            smtp_username: required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(required_env("SMTP_PASSWORD")?),
            from_address: required_env("SMTP_FROM")?,
            operator_address: required_env("OPERATOR_EMAIL")?,
        }))
    }
}

impl NotionConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = optional_validated_secret("NOTION_API_KEY")? else {
            return Ok(None);
        };
        Ok(Some(Self {
            api_key,
            database_id: required_env("NOTION_DATABASE_ID")?,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Minimal config with every optional integration disabled.
    pub fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/open_bar_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            abacatepay: None,
            email: None,
            notion: None,
            viacep_base_url: "https://viacep.com.br/ws".to_owned(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_is_https() {
        let mut config = test_config();
        assert!(!config.is_https());
        config.base_url = "https://openbar.com.br".to_owned();
        assert!(config.is_https());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let gateway = AbacatePayConfig {
            api_key: SecretString::from("abc_live_super_secret_value"),
            base_url: "https://api.abacatepay.com/v1".to_owned(),
            pix_expires_in: 3600,
        };
        let email = EmailConfig {
            smtp_host: "smtp.exemplo.com".to_owned(),
            smtp_port: 587,
            smtp_username: "mailer".to_owned(),
            smtp_password: SecretString::from("smtp_super_secret_value"),
            from_address: "Open Bar <no-reply@openbar.com.br>".to_owned(),
            operator_address: "contato@openbar.com.br".to_owned(),
        };

        let debug = format!("{gateway:?} {email:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("smtp.exemplo.com"));
        assert!(!debug.contains("super_secret"));
    }
}
