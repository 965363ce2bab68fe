//! Public JSON functions called directly by the browser.
//!
//! Every function answers `{"success": true, ...}` or, through [`AppError`],
//! `{"success": false, "error": "..."}`.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use open_bar_core::{CustomerInfo, Email};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::checkout::{OrderConfirmation, OrderItem};
use crate::services::email::{EmailLine, HomeVisit, PdfAttachment, QuoteEmail};
use crate::services::notion::NotionEvent;
use crate::services::pix::{BillingProduct, BillingRequest, PixGateway};
use crate::services::{AbacatePayClient, EmailService, NotionClient};
use crate::state::AppState;

const DEFAULT_PDF_NAME: &str = "orcamento-open-bar.pdf";

fn gateway(state: &AppState) -> Result<&AbacatePayClient> {
    state
        .checkout()
        .map(|c| c.gateway())
        .ok_or(AppError::Unavailable("Pagamento PIX"))
}

fn email(state: &AppState) -> Result<&EmailService> {
    state.email().ok_or(AppError::Unavailable("Email"))
}

fn notion(state: &AppState) -> Result<&NotionClient> {
    state.notion().ok_or(AppError::Unavailable("Notion"))
}

fn validation(e: impl ToString) -> AppError {
    AppError::Validation(e.to_string())
}

// =============================================================================
// create-pix-payment
// =============================================================================

/// Hosted PIX billing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePixPaymentRequest {
    /// Amount in cents
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_tax_id: String,
}

/// Create a gateway customer and a hosted PIX billing page.
#[instrument(skip_all, fields(amount = request.amount))]
pub async fn create_pix_payment(
    State(state): State<AppState>,
    Json(request): Json<CreatePixPaymentRequest>,
) -> Result<Json<Value>> {
    let gateway = gateway(&state)?;
    let customer = CustomerInfo {
        name: request.customer_name,
        email: request.customer_email,
        phone: request.customer_phone,
        tax_id: request.customer_tax_id,
    }
    .validate()
    .map_err(validation)?;
    if request.amount <= 0 {
        return Err(AppError::Validation("Valor inválido".to_owned()));
    }

    let customer_id = gateway.create_customer(&customer).await?;
    let base_url = state.config().base_url.trim_end_matches('/');
    let name = if request.description.trim().is_empty() {
        "Open Bar".to_owned()
    } else {
        request.description.trim().to_owned()
    };
    let billing = gateway
        .create_billing(&BillingRequest {
            customer_id,
            products: vec![BillingProduct {
                external_id: "open-bar-servico".to_owned(),
                name,
                quantity: 1,
                price: request.amount,
            }],
            return_url: format!("{base_url}/carrinho"),
            completion_url: format!("{base_url}/pagamento/concluido"),
        })
        .await?;

    tracing::info!(billing_id = %billing.id, "billing created");
    Ok(Json(json!({
        "success": true,
        "billingId": billing.id,
        "url": billing.url,
    })))
}

// =============================================================================
// check-pix-payment-status
// =============================================================================

/// Status lookup request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPixStatusRequest {
    #[serde(default)]
    pub pix_id: String,
}

/// Report the gateway status of a PIX charge.
#[instrument(skip_all, fields(pix_id = %request.pix_id))]
pub async fn check_pix_payment_status(
    State(state): State<AppState>,
    Json(request): Json<CheckPixStatusRequest>,
) -> Result<Json<Value>> {
    let gateway = gateway(&state)?;
    let pix_id = request.pix_id.trim();
    if pix_id.is_empty() {
        return Err(AppError::Validation("pixId é obrigatório".to_owned()));
    }

    let charge = gateway.check_charge(pix_id).await?;
    Ok(Json(json!({
        "success": true,
        "status": charge.status,
        "data": charge.raw,
    })))
}

// =============================================================================
// send-quote-email
// =============================================================================

/// One quote line as sent by the browser.
#[derive(Debug, Deserialize)]
pub struct QuoteItemInput {
    #[serde(alias = "nome")]
    pub title: String,
    #[serde(default = "one")]
    pub quantity: u32,
    /// Already formatted amount
    #[serde(default, alias = "valorTotalFormatado")]
    pub total: Option<String>,
}

const fn one() -> u32 {
    1
}

/// Quote email request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendQuoteEmailRequest {
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub items: Vec<QuoteItemInput>,
    #[serde(default, rename = "totalFormatado")]
    pub total_formatted: String,
    #[serde(default)]
    pub pdf_base64: Option<String>,
    #[serde(default)]
    pub pdf_filename: Option<String>,
}

/// Decode a base64 PDF, accepting an optional `data:` URL prefix.
fn decode_pdf(encoded: &str) -> Result<Vec<u8>> {
    let payload = encoded
        .split_once(";base64,")
        .map_or(encoded, |(_, data)| data)
        .trim();
    STANDARD
        .decode(payload)
        .map_err(|_| AppError::Validation("PDF inválido".to_owned()))
}

/// Email a quote summary to the customer and the operator.
#[instrument(skip_all)]
pub async fn send_quote_email(
    State(state): State<AppState>,
    Json(request): Json<SendQuoteEmailRequest>,
) -> Result<Json<Value>> {
    let email_service = email(&state)?;
    let customer_email = Email::parse(&request.customer_email).map_err(|_| {
        AppError::Validation("Email do cliente inválido".to_owned())
    })?;
    if request.items.is_empty() {
        return Err(AppError::Validation("O orçamento não possui itens".to_owned()));
    }

    let attachment = match request.pdf_base64.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(encoded) => Some(PdfAttachment {
            filename: request
                .pdf_filename
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PDF_NAME.to_owned()),
            bytes: decode_pdf(encoded)?,
        }),
        None => None,
    };

    let quote = QuoteEmail {
        customer_name: request.customer_name.trim().to_owned(),
        customer_email: customer_email.into_inner(),
        items: request
            .items
            .into_iter()
            .map(|item| EmailLine {
                title: item.title,
                quantity: item.quantity,
                total: item.total.unwrap_or_default(),
            })
            .collect(),
        total: request.total_formatted,
        attachment,
    };
    email_service.send_quote(&quote).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "to": quote.customer_email },
    })))
}

// =============================================================================
// send-order-confirmation
// =============================================================================

/// Order confirmation request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOrderConfirmationRequest {
    #[serde(default)]
    pub order_id: String,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Amount in cents
    pub amount: i64,
}

impl SendOrderConfirmationRequest {
    fn into_confirmation(self) -> Result<OrderConfirmation> {
        let order_id = self.order_id.trim();
        if order_id.is_empty() {
            return Err(AppError::Validation("orderId é obrigatório".to_owned()));
        }
        if self.amount <= 0 {
            return Err(AppError::Validation("Valor inválido".to_owned()));
        }
        Ok(OrderConfirmation {
            order_id: order_id.to_owned(),
            amount_cents: self.amount,
            customer: self.customer.validate().map_err(validation)?,
            items: self.items,
        })
    }
}

/// Email the order confirmation to the operator and the customer.
#[instrument(skip_all, fields(order_id = %request.order_id))]
pub async fn send_order_confirmation(
    State(state): State<AppState>,
    Json(request): Json<SendOrderConfirmationRequest>,
) -> Result<Json<Value>> {
    let email_service = email(&state)?;
    let order = request.into_confirmation()?;
    email_service.send_order_confirmation(&order).await?;

    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// create-notion-event
// =============================================================================

/// Record an event request in Notion.
#[instrument(skip_all)]
pub async fn create_notion_event(
    State(state): State<AppState>,
    Json(event): Json<NotionEvent>,
) -> Result<Json<Value>> {
    let page = notion(&state)?.create_event(&event).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "id": page.id, "url": page.url },
    })))
}

// =============================================================================
// notify-home-visit
// =============================================================================

/// Visit notice request. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyHomeVisitRequest {
    pub page: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

/// Tell the operator someone opened the site.
///
/// The email is sent in the background; the caller never waits on SMTP.
#[instrument(skip_all)]
pub async fn notify_home_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NotifyHomeVisitRequest>,
) -> Result<Json<Value>> {
    let email_service = email(&state)?.clone();
    let header_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let visit = HomeVisit {
        page: request.page.unwrap_or_else(|| "/".to_owned()),
        referrer: request.referrer.unwrap_or_else(|| "direto".to_owned()),
        user_agent: request
            .user_agent
            .or(header_agent)
            .unwrap_or_else(|| "desconhecido".to_owned()),
        visited_at: chrono::Utc::now().format("%d/%m/%Y %H:%M UTC").to_string(),
    };

    tokio::spawn(async move {
        if let Err(e) = email_service.send_home_visit(&visit).await {
            tracing::warn!(error = %e, "home visit notification failed");
        }
    });

    Ok(Json(json!({ "success": true })))
}
