//! PIX gateway seam.
//!
//! [`PixGateway`] is what the checkout orchestrator and the public payment
//! functions talk to. The production implementation is
//! [`AbacatePayClient`](super::abacatepay::AbacatePayClient); tests plug in
//! an in-memory fake.

use std::future::Future;

use open_bar_core::{CustomerInfo, PixStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum PixError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response was missing data the flow needs.
    #[error("Malformed gateway response: {0}")]
    Malformed(String),
}

impl PixError {
    /// Message safe to show to the customer.
    ///
    /// Gateway rejections are surfaced verbatim, transport failures are not.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(_) => "Não foi possível contatar o gateway de pagamento".to_owned(),
            Self::Malformed(_) => "Resposta inválida do gateway de pagamento".to_owned(),
        }
    }
}

/// One product line on a hosted billing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingProduct {
    pub external_id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit price in cents
    pub price: i64,
}

/// Request for a hosted one-time billing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingRequest {
    pub customer_id: String,
    pub products: Vec<BillingProduct>,
    pub return_url: String,
    pub completion_url: String,
}

/// A created billing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    pub id: String,
    pub url: String,
}

/// Request for a PIX QR code charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub amount_cents: i64,
    pub description: String,
    pub expires_in: u32,
    pub customer: CustomerInfo,
}

/// A PIX charge as returned by the gateway.
///
/// Fields are optional because the gateway does not guarantee them; the
/// caller decides what a usable charge is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixCharge {
    pub id: Option<String>,
    /// Copy-paste payment code (BR Code)
    pub br_code: Option<String>,
    /// QR image as a `data:` URL or base64 PNG
    pub qr_code_image: Option<String>,
    pub expires_at: Option<String>,
}

/// Charge status as reported by a check.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeStatus {
    pub status: PixStatus,
    pub expires_at: Option<String>,
    /// Full gateway payload, passed through to API callers
    pub raw: serde_json::Value,
}

/// Operations the checkout needs from a PIX payment provider.
pub trait PixGateway: Send + Sync + 'static {
    /// Register the payer and return the gateway customer id.
    fn create_customer(
        &self,
        customer: &CustomerInfo,
    ) -> impl Future<Output = Result<String, PixError>> + Send;

    /// Create a hosted billing page restricted to PIX.
    fn create_billing(
        &self,
        request: &BillingRequest,
    ) -> impl Future<Output = Result<Billing, PixError>> + Send;

    /// Create a PIX QR code charge.
    fn create_pix_charge(
        &self,
        request: &ChargeRequest,
    ) -> impl Future<Output = Result<PixCharge, PixError>> + Send;

    /// Look up the current status of a PIX charge.
    fn check_charge(
        &self,
        pix_id: &str,
    ) -> impl Future<Output = Result<ChargeStatus, PixError>> + Send;
}
