//! Transactional email over SMTP.
//!
//! Quote summaries, order confirmations and visit notices are rendered with
//! Askama (an HTML and a plain-text body each) and sent with lettre.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use open_bar_core::Price;
use secrecy::ExposeSecret;
use thiserror::Error;

use super::checkout::{OrderConfirmation, OrderItem, OrderNotifier};
use crate::config::EmailConfig;

/// One rendered line in an email body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailLine {
    pub title: String,
    pub quantity: u32,
    /// Formatted amount, empty when the line has no price
    pub total: String,
}

impl From<&OrderItem> for EmailLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            title: item.title.clone(),
            quantity: item.quantity,
            total: item.total.map(|p| p.display()).unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "email/order.html")]
struct OrderEmailHtml<'a> {
    heading: &'a str,
    for_operator: bool,
    customer_name: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
    customer_tax_id: &'a str,
    order_id: &'a str,
    amount: &'a str,
    items: &'a [EmailLine],
}

#[derive(Template)]
#[template(path = "email/order.txt")]
struct OrderEmailText<'a> {
    heading: &'a str,
    for_operator: bool,
    customer_name: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
    customer_tax_id: &'a str,
    order_id: &'a str,
    amount: &'a str,
    items: &'a [EmailLine],
}

#[derive(Template)]
#[template(path = "email/quote.html")]
struct QuoteEmailHtml<'a> {
    for_operator: bool,
    customer_name: &'a str,
    customer_email: &'a str,
    items: &'a [EmailLine],
    total: &'a str,
    has_attachment: bool,
}

#[derive(Template)]
#[template(path = "email/quote.txt")]
struct QuoteEmailText<'a> {
    for_operator: bool,
    customer_name: &'a str,
    customer_email: &'a str,
    items: &'a [EmailLine],
    total: &'a str,
    has_attachment: bool,
}

#[derive(Template)]
#[template(path = "email/home_visit.html")]
struct HomeVisitEmailHtml<'a> {
    page: &'a str,
    referrer: &'a str,
    user_agent: &'a str,
    visited_at: &'a str,
}

#[derive(Template)]
#[template(path = "email/home_visit.txt")]
struct HomeVisitEmailText<'a> {
    page: &'a str,
    referrer: &'a str,
    user_agent: &'a str,
    visited_at: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Attachment could not be decoded.
    #[error("Invalid attachment: {0}")]
    Attachment(String),
}

impl EmailError {
    /// Whether the failure was caused by caller input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidAddress(_) | Self::Attachment(_))
    }
}

/// A PDF attached to a quote email.
#[derive(Debug, Clone)]
pub struct PdfAttachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A quote summary to send.
#[derive(Debug, Clone)]
pub struct QuoteEmail {
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<EmailLine>,
    pub total: String,
    pub attachment: Option<PdfAttachment>,
}

/// A site visit to report.
#[derive(Debug, Clone, Default)]
pub struct HomeVisit {
    pub page: String,
    pub referrer: String,
    pub user_agent: String,
    pub visited_at: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    operator_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_owned(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            operator_address: config.operator_address.clone(),
        })
    }

    /// Send a quote summary to the customer and to the operator.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or either delivery fails.
    pub async fn send_quote(&self, quote: &QuoteEmail) -> Result<(), EmailError> {
        let has_attachment = quote.attachment.is_some();
        for (to, for_operator, subject) in [
            (quote.customer_email.as_str(), false, "Seu orçamento Open Bar"),
            (
                self.operator_address.as_str(),
                true,
                "Novo orçamento solicitado",
            ),
        ] {
            let html = QuoteEmailHtml {
                for_operator,
                customer_name: &quote.customer_name,
                customer_email: &quote.customer_email,
                items: &quote.items,
                total: &quote.total,
                has_attachment,
            }
            .render()?;
            let text = QuoteEmailText {
                for_operator,
                customer_name: &quote.customer_name,
                customer_email: &quote.customer_email,
                items: &quote.items,
                total: &quote.total,
                has_attachment,
            }
            .render()?;

            self.send(to, subject, &text, &html, quote.attachment.as_ref())
                .await?;
        }
        Ok(())
    }

    /// Send the order confirmation to the operator and the customer.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or either delivery fails.
    #[tracing::instrument(skip_all, fields(order_id = %order.order_id))]
    pub async fn send_order_confirmation(
        &self,
        order: &OrderConfirmation,
    ) -> Result<(), EmailError> {
        let items: Vec<EmailLine> = order.items.iter().map(EmailLine::from).collect();
        let amount = Price::from_cents(order.amount_cents).display();
        let customer = &order.customer;

        for (to, for_operator, heading) in [
            (
                self.operator_address.as_str(),
                true,
                "Novo pedido confirmado",
            ),
            (customer.email.as_str(), false, "Pagamento confirmado"),
        ] {
            let html = OrderEmailHtml {
                heading,
                for_operator,
                customer_name: &customer.name,
                customer_email: &customer.email,
                customer_phone: &customer.phone,
                customer_tax_id: &customer.tax_id,
                order_id: &order.order_id,
                amount: &amount,
                items: &items,
            }
            .render()?;
            let text = OrderEmailText {
                heading,
                for_operator,
                customer_name: &customer.name,
                customer_email: &customer.email,
                customer_phone: &customer.phone,
                customer_tax_id: &customer.tax_id,
                order_id: &order.order_id,
                amount: &amount,
                items: &items,
            }
            .render()?;

            let subject = format!("{heading} - {}", order.order_id);
            self.send(to, &subject, &text, &html, None).await?;
        }
        Ok(())
    }

    /// Tell the operator someone visited the site.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or delivery fails.
    pub async fn send_home_visit(&self, visit: &HomeVisit) -> Result<(), EmailError> {
        let html = HomeVisitEmailHtml {
            page: &visit.page,
            referrer: &visit.referrer,
            user_agent: &visit.user_agent,
            visited_at: &visit.visited_at,
        }
        .render()?;
        let text = HomeVisitEmailText {
            page: &visit.page,
            referrer: &visit.referrer,
            user_agent: &visit.user_agent,
            visited_at: &visit.visited_at,
        }
        .render()?;

        self.send(&self.operator_address, "Nova visita ao site", &text, &html, None)
            .await
    }

    /// Send a text+HTML email, optionally with a PDF attached.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
        attachment: Option<&PdfAttachment>,
    ) -> Result<(), EmailError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(to.to_owned()))?;

        let body = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(text_body.to_owned()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(html_body.to_owned()),
            );

        let builder = Message::builder().from(from).to(to_mailbox).subject(subject);
        let email = match attachment {
            Some(pdf) => {
                let content_type = ContentType::parse("application/pdf")
                    .map_err(|e| EmailError::Attachment(e.to_string()))?;
                builder.multipart(
                    MultiPart::mixed().multipart(body).singlepart(
                        Attachment::new(pdf.filename.clone()).body(pdf.bytes.clone(), content_type),
                    ),
                )?
            }
            None => builder.multipart(body)?,
        };

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

impl OrderNotifier for EmailService {
    type Error = EmailError;

    async fn notify_order_confirmed(&self, order: &OrderConfirmation) -> Result<(), EmailError> {
        self.send_order_confirmation(order).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines() -> Vec<EmailLine> {
        vec![
            EmailLine::from(&OrderItem {
                title: "Open Bar 4h".into(),
                quantity: 1,
                total: Some(Price::from_reais(1800)),
            }),
            EmailLine::from(&OrderItem {
                title: "Caipirinha".into(),
                quantity: 3,
                total: None,
            }),
        ]
    }

    #[test]
    fn test_email_line_formats_total() {
        let lines = lines();
        assert_eq!(lines[0].total, "R$ 1.800,00");
        assert_eq!(lines[1].total, "");
    }

    #[test]
    fn test_order_email_renders_contact_and_items() {
        let items = lines();
        let text = OrderEmailText {
            heading: "Novo pedido confirmado",
            for_operator: true,
            customer_name: "Ana Souza",
            customer_email: "ana@exemplo.com",
            customer_phone: "11999990000",
            customer_tax_id: "52998224725",
            order_id: "pix_char_1",
            amount: "R$ 1.800,00",
            items: &items,
        }
        .render()
        .unwrap();

        assert!(text.contains("Pedido: pix_char_1"));
        assert!(text.contains("Valor pago: R$ 1.800,00"));
        assert!(text.contains("3x Caipirinha"));
        assert!(text.contains("CPF/CNPJ: 52998224725"));
        assert!(text.contains("Um novo pagamento PIX foi confirmado."));
    }

    #[test]
    fn test_quote_html_escapes_customer_input() {
        let items = lines();
        let html = QuoteEmailHtml {
            for_operator: true,
            customer_name: "<script>alert(1)</script>",
            customer_email: "ana@exemplo.com",
            items: &items,
            total: "R$ 1.800,00",
            has_attachment: true,
        }
        .render()
        .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("em anexo"));
    }

    #[test]
    fn test_home_visit_text() {
        let text = HomeVisitEmailText {
            page: "/",
            referrer: "instagram.com",
            user_agent: "Mozilla/5.0",
            visited_at: "2026-10-18 20:00",
        }
        .render()
        .unwrap();
        assert!(text.contains("Origem: instagram.com"));
    }
}
