//! PIX checkout orchestration.
//!
//! Each checkout attempt is a [`PaymentSession`] moving through
//!
//! ```text
//! Creating -> AwaitingPayment -> Checking -> Confirmed
//!     |               ^              |
//!     v               +--------------+ (not paid yet / check error)
//!   Failed                           |
//!                                    v
//!                                 Expired
//! ```
//!
//! Status is only checked when the customer asks for it; nothing polls the
//! gateway in the background. A check abandoned mid-call (client gone) puts
//! the session back to `AwaitingPayment`. `Failed` and `Expired` are
//! terminal: a retry consumes the session and starts a brand-new one with a
//! new gateway charge.
//!
//! Sessions live in an in-memory cache for two hours. The visitor's web
//! session only stores the session id.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use open_bar_core::{CustomerInfo, PixStatus, Price};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::pix::{ChargeRequest, PixGateway};

/// How long a payment session stays retrievable.
const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Upper bound on concurrently tracked sessions.
const MAX_SESSIONS: u64 = 10_000;

const NOT_CONFIRMED_MESSAGE: &str =
    "Pagamento ainda não confirmado. Aguarde alguns instantes e tente novamente.";
const EXPIRED_MESSAGE: &str = "O código PIX expirou. Gere um novo código para continuar.";

/// One line of an order as shown in emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(alias = "nome")]
    pub title: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub total: Option<Price>,
}

const fn default_quantity() -> u32 {
    1
}

/// What is being paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub amount: Price,
    pub description: String,
    pub items: Vec<OrderItem>,
}

/// Data sent to the notifier once a payment is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub amount_cents: i64,
    pub items: Vec<OrderItem>,
    pub customer: CustomerInfo,
}

/// Sends order confirmations to the operator and the customer.
pub trait OrderNotifier: Send + Sync + 'static {
    /// Notification failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver a confirmation for `order`.
    fn notify_order_confirmed(
        &self,
        order: &OrderConfirmation,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl<N: OrderNotifier> OrderNotifier for Option<N> {
    type Error = N::Error;

    async fn notify_order_confirmed(&self, order: &OrderConfirmation) -> Result<(), N::Error> {
        match self {
            Some(notifier) => notifier.notify_order_confirmed(order).await,
            None => {
                tracing::warn!(order_id = %order.order_id, "no notifier configured, skipping order confirmation");
                Ok(())
            }
        }
    }
}

/// A charge the customer can pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixDetails {
    pub pix_id: String,
    /// Copy-paste payment code
    pub br_code: String,
    /// QR code image reference
    pub qr_code_image: String,
    pub expires_at: Option<String>,
}

/// Data for the completion view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub pix_id: String,
    pub amount: i64,
    pub status: PixStatus,
}

/// Why a session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Customer or cart data was rejected before reaching the gateway.
    Validation,
    /// The gateway failed or answered with unusable data.
    Gateway,
}

/// Where a payment session stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PaymentState {
    Idle,
    Creating,
    AwaitingPayment { pix: PixDetails },
    Checking { pix: PixDetails },
    Confirmed { completion: Completion },
    Expired { pix_id: String },
    Failed { kind: FailureKind, error: String },
}

impl PaymentState {
    /// Whether the session can be replaced by a fresh attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Expired { .. })
    }
}

/// One checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub id: Uuid,
    #[serde(flatten)]
    pub state: PaymentState,
    /// Informational message for the customer ("not yet confirmed", ...)
    pub message: Option<String>,
    pub amount_cents: i64,
    pub amount_formatted: String,
    #[serde(skip)]
    pub customer: CustomerInfo,
    /// Customer id registered with the gateway, kept for support lookups.
    #[serde(skip)]
    pub customer_id: Option<String>,
    #[serde(skip)]
    pub order: OrderDraft,
    pub created_at: DateTime<Utc>,
}

/// Result of a status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Session updated (or unchanged when not awaiting payment).
    Updated(PaymentSession),
    /// Another check for this session is still running.
    InProgress,
    /// No such session (unknown id or expired from the cache).
    NotFound,
}

/// Errors from [`CheckoutService::retry`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RetryError {
    #[error("Sessão de pagamento não encontrada")]
    NotFound,
    #[error("Só é possível gerar um novo PIX após falha ou expiração")]
    NotRetryable,
}

/// Marks a session `Checking` for the duration of a gateway call.
///
/// Dropping it while the session is still `Checking` restores
/// `AwaitingPayment`, so a cancelled check never strands the session.
struct CheckInFlight<'a> {
    session: &'a mut PaymentSession,
    pix: PixDetails,
}

impl<'a> CheckInFlight<'a> {
    fn begin(session: &'a mut PaymentSession, pix: PixDetails) -> Self {
        session.state = PaymentState::Checking { pix: pix.clone() };
        Self { session, pix }
    }
}

impl Drop for CheckInFlight<'_> {
    fn drop(&mut self) {
        if matches!(self.session.state, PaymentState::Checking { .. }) {
            tracing::debug!(session_id = %self.session.id, "status check abandoned");
            self.session.state = PaymentState::AwaitingPayment {
                pix: self.pix.clone(),
            };
        }
    }
}

/// Drives payment sessions against a [`PixGateway`].
pub struct CheckoutService<G, N> {
    gateway: Arc<G>,
    notifier: Arc<N>,
    sessions: Cache<Uuid, Arc<Mutex<PaymentSession>>>,
    expires_in: u32,
}

impl<G, N> Clone for CheckoutService<G, N> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            notifier: Arc::clone(&self.notifier),
            sessions: self.sessions.clone(),
            expires_in: self.expires_in,
        }
    }
}

impl<G: PixGateway, N: OrderNotifier> CheckoutService<G, N> {
    /// Create a checkout service issuing PIX codes valid for `expires_in` seconds.
    pub fn new(gateway: G, notifier: N, expires_in: u32) -> Self {
        Self {
            gateway: Arc::new(gateway),
            notifier: Arc::new(notifier),
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_live(SESSION_TTL)
                .build(),
            expires_in,
        }
    }

    /// The underlying gateway, for direct API calls.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Snapshot of a session.
    pub async fn get(&self, id: Uuid) -> Option<PaymentSession> {
        let session = self.sessions.get(&id).await?;
        let guard = session.lock().await;
        Some(guard.clone())
    }

    /// Start a new payment session.
    ///
    /// Always returns a session. Validation problems and gateway failures are
    /// reported as [`PaymentState::Failed`] so the customer can retry.
    #[tracing::instrument(skip_all, fields(amount = %order.amount))]
    pub async fn start(&self, customer: CustomerInfo, order: OrderDraft) -> PaymentSession {
        let amount_cents = order.amount.to_cents();
        let mut session = PaymentSession {
            id: Uuid::new_v4(),
            state: PaymentState::Creating,
            message: None,
            amount_cents,
            amount_formatted: order.amount.display(),
            customer,
            customer_id: None,
            order,
            created_at: Utc::now(),
        };

        session.state = match self.create_charge(&mut session).await {
            Ok(pix) => {
                tracing::info!(session_id = %session.id, pix_id = %pix.pix_id, "PIX charge created");
                PaymentState::AwaitingPayment { pix }
            }
            Err((kind, error)) => {
                tracing::warn!(session_id = %session.id, ?kind, %error, "checkout failed");
                PaymentState::Failed { kind, error }
            }
        };

        self.sessions
            .insert(session.id, Arc::new(Mutex::new(session.clone())))
            .await;
        session
    }

    async fn create_charge(
        &self,
        session: &mut PaymentSession,
    ) -> Result<PixDetails, (FailureKind, String)> {
        let customer = session
            .customer
            .validate()
            .map_err(|e| (FailureKind::Validation, e.to_string()))?;
        session.customer = customer;

        if session.amount_cents <= 0 {
            return Err((
                FailureKind::Validation,
                "O carrinho não possui itens com valor".to_owned(),
            ));
        }

        let gateway_error = |e: super::pix::PixError| (FailureKind::Gateway, e.client_message());

        // The QR code endpoint takes the customer inline, not by id.
        let customer_id = self
            .gateway
            .create_customer(&session.customer)
            .await
            .map_err(gateway_error)?;
        tracing::debug!(session_id = %session.id, %customer_id, "gateway customer registered");
        session.customer_id = Some(customer_id);

        let charge = self
            .gateway
            .create_pix_charge(&ChargeRequest {
                amount_cents: session.amount_cents,
                description: session.order.description.clone(),
                expires_in: self.expires_in,
                customer: session.customer.clone(),
            })
            .await
            .map_err(gateway_error)?;

        match (charge.id, charge.br_code, charge.qr_code_image) {
            (Some(pix_id), Some(br_code), Some(qr_code_image))
                if !pix_id.is_empty() && !br_code.is_empty() && !qr_code_image.is_empty() =>
            {
                Ok(PixDetails {
                    pix_id,
                    br_code,
                    qr_code_image,
                    expires_at: charge.expires_at,
                })
            }
            _ => Err((
                FailureKind::Gateway,
                "Resposta incompleta do gateway de pagamento".to_owned(),
            )),
        }
    }

    /// Ask the gateway whether the session's charge was paid.
    ///
    /// Overlapping checks on the same session are dropped with
    /// [`CheckOutcome::InProgress`].
    #[tracing::instrument(skip(self))]
    pub async fn check(&self, id: Uuid) -> CheckOutcome {
        let Some(session) = self.sessions.get(&id).await else {
            return CheckOutcome::NotFound;
        };
        let Ok(mut guard) = session.try_lock() else {
            tracing::debug!("status check already in flight");
            return CheckOutcome::InProgress;
        };

        let PaymentState::AwaitingPayment { pix } = guard.state.clone() else {
            return CheckOutcome::Updated(guard.clone());
        };

        let check = CheckInFlight::begin(&mut guard, pix.clone());
        let result = self.gateway.check_charge(&pix.pix_id).await;
        let session = &mut *check.session;

        match result {
            Ok(charge) if charge.status == PixStatus::Paid => {
                session.state = PaymentState::Confirmed {
                    completion: Completion {
                        pix_id: pix.pix_id.clone(),
                        amount: session.amount_cents,
                        status: PixStatus::Paid,
                    },
                };
                session.message = None;
                tracing::info!(pix_id = %pix.pix_id, "payment confirmed");
                self.spawn_notification(OrderConfirmation {
                    order_id: pix.pix_id,
                    amount_cents: session.amount_cents,
                    items: session.order.items.clone(),
                    customer: session.customer.clone(),
                });
            }
            Ok(charge) if charge.status == PixStatus::Expired => {
                session.state = PaymentState::Expired { pix_id: pix.pix_id };
                session.message = Some(EXPIRED_MESSAGE.to_owned());
            }
            Ok(charge) => {
                tracing::debug!(status = ?charge.status, "payment not confirmed yet");
                session.state = PaymentState::AwaitingPayment { pix };
                session.message = Some(NOT_CONFIRMED_MESSAGE.to_owned());
            }
            Err(e) => {
                tracing::warn!(error = %e, "status check failed");
                session.state = PaymentState::AwaitingPayment { pix };
                session.message = Some(e.client_message());
            }
        }

        let snapshot = session.clone();
        drop(check);
        CheckOutcome::Updated(snapshot)
    }

    /// Replace a failed or expired session with a fresh attempt using the
    /// same customer and order.
    ///
    /// The old session is removed from the cache before the new charge is
    /// created, so concurrent retries of one session create one charge.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError`] when the session is unknown, already retried
    /// or still live.
    #[tracing::instrument(skip(self))]
    pub async fn retry(&self, id: Uuid) -> Result<PaymentSession, RetryError> {
        let slot = self.sessions.get(&id).await.ok_or(RetryError::NotFound)?;
        let previous = {
            let guard = slot.lock().await;
            if !guard.state.is_retryable() {
                return Err(RetryError::NotRetryable);
            }
            if self.sessions.remove(&id).await.is_none() {
                tracing::debug!("session already replaced by a concurrent retry");
                return Err(RetryError::NotFound);
            }
            guard.clone()
        };
        Ok(self.start(previous.customer, previous.order).await)
    }

    fn spawn_notification(&self, order: OrderConfirmation) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_order_confirmed(&order).await {
                tracing::error!(order_id = %order.order_id, error = %e, "order confirmation email failed");
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::convert::Infallible;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::services::pix::{Billing, BillingRequest, ChargeStatus, PixCharge, PixError};

    /// Gateway double with scripted answers.
    pub struct FakeGateway {
        pub charge: StdMutex<Result<PixCharge, u16>>,
        pub statuses: StdMutex<Vec<PixStatus>>,
        pub customer_calls: AtomicUsize,
        pub charge_calls: AtomicUsize,
        pub check_delay: Duration,
    }

    impl Default for FakeGateway {
        fn default() -> Self {
            Self {
                charge: StdMutex::new(Ok(PixCharge {
                    id: Some("pix_char_1".into()),
                    br_code: Some("00020101021226...".into()),
                    qr_code_image: Some("data:image/png;base64,iVBOR".into()),
                    expires_at: None,
                })),
                statuses: StdMutex::new(Vec::new()),
                customer_calls: AtomicUsize::new(0),
                charge_calls: AtomicUsize::new(0),
                check_delay: Duration::ZERO,
            }
        }
    }

    impl PixGateway for FakeGateway {
        async fn create_customer(&self, _customer: &CustomerInfo) -> Result<String, PixError> {
            self.customer_calls.fetch_add(1, Ordering::SeqCst);
            Ok("cust_1".into())
        }

        async fn create_billing(&self, _request: &BillingRequest) -> Result<Billing, PixError> {
            Ok(Billing {
                id: "bill_1".into(),
                url: "https://pay.exemplo/bill_1".into(),
            })
        }

        async fn create_pix_charge(&self, _request: &ChargeRequest) -> Result<PixCharge, PixError> {
            let n = self.charge_calls.fetch_add(1, Ordering::SeqCst);
            match self.charge.lock().unwrap().clone() {
                Ok(mut charge) => {
                    charge.id = charge.id.map(|id| format!("{id}_{n}"));
                    Ok(charge)
                }
                Err(status) => Err(PixError::Api {
                    status,
                    message: "Invalid taxId".into(),
                }),
            }
        }

        async fn check_charge(&self, _pix_id: &str) -> Result<ChargeStatus, PixError> {
            if !self.check_delay.is_zero() {
                tokio::time::sleep(self.check_delay).await;
            }
            let status = self.statuses.lock().unwrap().pop().unwrap_or(PixStatus::Pending);
            Ok(ChargeStatus {
                status,
                expires_at: None,
                raw: serde_json::json!({ "status": status }),
            })
        }
    }

    /// Notifier double that records confirmations.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: StdMutex<Vec<OrderConfirmation>>,
    }

    impl OrderNotifier for RecordingNotifier {
        type Error = Infallible;

        async fn notify_order_confirmed(&self, order: &OrderConfirmation) -> Result<(), Infallible> {
            self.sent.lock().unwrap().push(order.clone());
            Ok(())
        }
    }

    pub fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ana Souza".into(),
            email: "ana@exemplo.com".into(),
            phone: "11999990000".into(),
            tax_id: "52998224725".into(),
        }
    }

    pub fn order() -> OrderDraft {
        OrderDraft {
            amount: Price::from_reais(850),
            description: "Open Bar".into(),
            items: vec![OrderItem {
                title: "Open Bar 3h".into(),
                quantity: 1,
                total: Some(Price::from_reais(850)),
            }],
        }
    }

    fn service(gateway: FakeGateway) -> CheckoutService<FakeGateway, RecordingNotifier> {
        CheckoutService::new(gateway, RecordingNotifier::default(), 3600)
    }

    #[tokio::test]
    async fn test_start_awaits_payment() {
        let checkout = service(FakeGateway::default());
        let session = checkout.start(customer(), order()).await;

        assert!(matches!(session.state, PaymentState::AwaitingPayment { .. }));
        assert_eq!(session.amount_cents, 85_000);
        assert_eq!(session.amount_formatted, "R$ 850,00");
        assert_eq!(checkout.get(session.id).await.unwrap(), session);
    }

    #[tokio::test]
    async fn test_missing_customer_field_skips_gateway() {
        let checkout = service(FakeGateway::default());
        let mut incomplete = customer();
        incomplete.tax_id = "  ".into();

        let session = checkout.start(incomplete, order()).await;
        assert!(matches!(
            session.state,
            PaymentState::Failed { kind: FailureKind::Validation, .. }
        ));
        assert_eq!(checkout.gateway().customer_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_total_is_rejected() {
        let checkout = service(FakeGateway::default());
        let mut empty = order();
        empty.amount = Price::zero();
        let session = checkout.start(customer(), empty).await;
        assert!(matches!(
            session.state,
            PaymentState::Failed { kind: FailureKind::Validation, .. }
        ));
    }

    #[tokio::test]
    async fn test_gateway_error_is_surfaced() {
        let gateway = FakeGateway::default();
        *gateway.charge.lock().unwrap() = Err(422);
        let checkout = service(gateway);

        let session = checkout.start(customer(), order()).await;
        assert_eq!(
            session.state,
            PaymentState::Failed {
                kind: FailureKind::Gateway,
                error: "Invalid taxId".into()
            }
        );
        assert_eq!(checkout.gateway().charge_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_incomplete_charge_fails() {
        let gateway = FakeGateway::default();
        gateway.charge.lock().unwrap().as_mut().unwrap().br_code = None;
        let checkout = service(gateway);

        let session = checkout.start(customer(), order()).await;
        assert!(matches!(
            session.state,
            PaymentState::Failed { kind: FailureKind::Gateway, .. }
        ));
    }

    #[tokio::test]
    async fn test_paid_confirms_and_notifies() {
        let gateway = FakeGateway::default();
        gateway.statuses.lock().unwrap().push(PixStatus::Paid);
        let checkout = service(gateway);
        let session = checkout.start(customer(), order()).await;

        let CheckOutcome::Updated(updated) = checkout.check(session.id).await else {
            panic!("expected an updated session");
        };
        let PaymentState::Confirmed { completion } = updated.state else {
            panic!("expected confirmation, got {:?}", updated.state);
        };
        assert_eq!(completion.amount, 85_000);
        assert_eq!(completion.status, PixStatus::Paid);

        // Notification runs on a spawned task.
        for _ in 0..50 {
            if !checkout.notifier.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let sent = checkout.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].order_id, completion.pix_id);
        assert_eq!(sent[0].customer.email, "ana@exemplo.com");
    }

    #[tokio::test]
    async fn test_pending_stays_awaiting_with_message() {
        let checkout = service(FakeGateway::default());
        let session = checkout.start(customer(), order()).await;

        let CheckOutcome::Updated(updated) = checkout.check(session.id).await else {
            panic!("expected an updated session");
        };
        assert!(matches!(updated.state, PaymentState::AwaitingPayment { .. }));
        assert_eq!(updated.message.as_deref(), Some(NOT_CONFIRMED_MESSAGE));
    }

    #[tokio::test]
    async fn test_expired_offers_retry_with_new_charge() {
        let gateway = FakeGateway::default();
        gateway.statuses.lock().unwrap().push(PixStatus::Expired);
        let checkout = service(gateway);
        let session = checkout.start(customer(), order()).await;

        let CheckOutcome::Updated(expired) = checkout.check(session.id).await else {
            panic!("expected an updated session");
        };
        assert!(expired.state.is_retryable());
        assert!(checkout.notifier.sent.lock().unwrap().is_empty());

        let fresh = checkout.retry(session.id).await.unwrap();
        assert_ne!(fresh.id, session.id);
        let (PaymentState::AwaitingPayment { pix: old }, PaymentState::AwaitingPayment { pix: new }) =
            (&session.state, &fresh.state)
        else {
            panic!("expected two live charges");
        };
        assert_ne!(old.pix_id, new.pix_id);
        assert_eq!(checkout.get(session.id).await, None);
    }

    #[tokio::test]
    async fn test_retry_rejects_live_session() {
        let checkout = service(FakeGateway::default());
        let session = checkout.start(customer(), order()).await;
        assert_eq!(
            checkout.retry(session.id).await.unwrap_err(),
            RetryError::NotRetryable
        );
        assert_eq!(
            checkout.retry(Uuid::new_v4()).await.unwrap_err(),
            RetryError::NotFound
        );
    }

    #[tokio::test]
    async fn test_overlapping_checks_are_ignored() {
        let gateway = FakeGateway {
            check_delay: Duration::from_millis(100),
            ..FakeGateway::default()
        };
        let checkout = service(gateway);
        let session = checkout.start(customer(), order()).await;

        let (first, second) = tokio::join!(checkout.check(session.id), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            checkout.check(session.id).await
        });
        assert!(matches!(first, CheckOutcome::Updated(_)));
        assert_eq!(second, CheckOutcome::InProgress);
    }

    #[tokio::test]
    async fn test_abandoned_check_can_be_repeated() {
        let gateway = FakeGateway {
            check_delay: Duration::from_millis(200),
            ..FakeGateway::default()
        };
        let checkout = service(gateway);
        let session = checkout.start(customer(), order()).await;

        let cut_off =
            tokio::time::timeout(Duration::from_millis(20), checkout.check(session.id)).await;
        assert!(cut_off.is_err());
        assert!(matches!(
            checkout.get(session.id).await.unwrap().state,
            PaymentState::AwaitingPayment { .. }
        ));

        checkout.gateway().statuses.lock().unwrap().push(PixStatus::Paid);
        let CheckOutcome::Updated(updated) = checkout.check(session.id).await else {
            panic!("expected an updated session");
        };
        assert!(matches!(updated.state, PaymentState::Confirmed { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_retries_create_one_charge() {
        let gateway = FakeGateway::default();
        gateway.statuses.lock().unwrap().push(PixStatus::Expired);
        let checkout = service(gateway);
        let session = checkout.start(customer(), order()).await;
        checkout.check(session.id).await;
        let charges_before = checkout.gateway().charge_calls.load(Ordering::SeqCst);

        let (first, second) = tokio::join!(checkout.retry(session.id), checkout.retry(session.id));
        assert_eq!(
            usize::from(first.is_ok()) + usize::from(second.is_ok()),
            1,
            "{first:?} / {second:?}"
        );
        assert_eq!(
            checkout.gateway().charge_calls.load(Ordering::SeqCst),
            charges_before + 1
        );
        assert_eq!(checkout.retry(session.id).await, Err(RetryError::NotFound));
    }

    #[tokio::test]
    async fn test_start_keeps_gateway_customer() {
        let checkout = service(FakeGateway::default());
        let session = checkout.start(customer(), order()).await;
        assert_eq!(session.customer_id.as_deref(), Some("cust_1"));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let checkout = service(FakeGateway::default());
        assert_eq!(checkout.check(Uuid::new_v4()).await, CheckOutcome::NotFound);
    }
}
