//! PIX checkout for the visitor's cart.
//!
//! The visitor session holds the id of the current payment session; the
//! payment session itself lives in the [`CheckoutService`] cache.
//!
//! [`CheckoutService`]: crate::services::CheckoutService

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use open_bar_core::{CartLine, CustomerInfo};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::services::checkout::{
    CheckOutcome, FailureKind, OrderDraft, OrderItem, PaymentSession, PaymentState, RetryError,
};
use crate::services::{SessionCart, open_cart};
use crate::state::{AppState, Checkout};

/// Checkout response: the payment session plus the usual `success` flag.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(flatten)]
    pub session: PaymentSession,
}

impl IntoResponse for CheckoutResponse {
    fn into_response(self) -> Response {
        let status = match &self.session.state {
            PaymentState::Failed {
                kind: FailureKind::Validation,
                ..
            } => StatusCode::BAD_REQUEST,
            PaymentState::Failed {
                kind: FailureKind::Gateway,
                ..
            } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}

impl From<PaymentSession> for CheckoutResponse {
    fn from(session: PaymentSession) -> Self {
        Self {
            success: !matches!(session.state, PaymentState::Failed { .. }),
            session,
        }
    }
}

fn checkout(state: &AppState) -> Result<&Checkout> {
    state.checkout().ok_or(AppError::Unavailable("Pagamento PIX"))
}

async fn current_id(session: &Session) -> Result<Uuid> {
    session
        .get::<Uuid>(session_keys::CHECKOUT_ID)
        .await?
        .ok_or_else(|| AppError::NotFound("Nenhum pagamento em andamento".to_owned()))
}

/// Build the order being paid from the cart contents.
fn order_from_cart(cart: &SessionCart) -> OrderDraft {
    let items: Vec<OrderItem> = cart
        .lines()
        .iter()
        .map(|line| OrderItem {
            title: line.title().to_owned(),
            quantity: line.quantity(),
            total: match line {
                CartLine::Service(s) => Some(s.valor_total),
                CartLine::Drink(_) => None,
            },
        })
        .collect();
    let services = cart
        .lines()
        .iter()
        .filter(|line| matches!(line, CartLine::Service(_)))
        .count();
    OrderDraft {
        amount: cart.total(),
        description: format!("Open Bar - {services} serviço(s)"),
        items,
    }
}

/// Current payment session, if any.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CheckoutResponse> {
    let checkout = checkout(&state)?;
    let id = current_id(&session).await?;
    checkout
        .get(id)
        .await
        .map(CheckoutResponse::from)
        .ok_or_else(|| AppError::NotFound("Sessão de pagamento expirada".to_owned()))
}

/// Start paying for the cart.
#[instrument(skip_all)]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    Json(customer): Json<CustomerInfo>,
) -> Result<CheckoutResponse> {
    let checkout = checkout(&state)?;
    let cart = open_cart(session.clone()).await;
    if cart.is_empty() {
        return Err(AppError::Validation("O carrinho está vazio".to_owned()));
    }

    let payment = checkout.start(customer, order_from_cart(&cart)).await;
    session.insert(session_keys::CHECKOUT_ID, payment.id).await?;
    add_breadcrumb(
        "checkout",
        "PIX checkout started",
        &[("amount", &payment.amount_formatted)],
    );
    Ok(payment.into())
}

/// The customer says they paid: ask the gateway.
#[instrument(skip_all)]
pub async fn check(State(state): State<AppState>, session: Session) -> Result<CheckoutResponse> {
    let checkout = checkout(&state)?;
    let id = current_id(&session).await?;

    match checkout.check(id).await {
        CheckOutcome::Updated(payment) => {
            if matches!(payment.state, PaymentState::Confirmed { .. }) {
                let mut cart = open_cart(session).await;
                cart.clear().await?;
                add_breadcrumb("checkout", "Payment confirmed", &[]);
            }
            Ok(payment.into())
        }
        CheckOutcome::InProgress => Err(AppError::Conflict(
            "Verificação em andamento, aguarde".to_owned(),
        )),
        CheckOutcome::NotFound => Err(AppError::NotFound(
            "Sessão de pagamento expirada".to_owned(),
        )),
    }
}

/// Start over with a fresh PIX code after a failure or expiry.
#[instrument(skip_all)]
pub async fn retry(State(state): State<AppState>, session: Session) -> Result<CheckoutResponse> {
    let checkout = checkout(&state)?;
    let id = current_id(&session).await?;

    let payment = checkout.retry(id).await.map_err(|e| match e {
        RetryError::NotFound => AppError::NotFound(e.to_string()),
        RetryError::NotRetryable => AppError::Conflict(e.to_string()),
    })?;
    session.insert(session_keys::CHECKOUT_ID, payment.id).await?;
    Ok(payment.into())
}
