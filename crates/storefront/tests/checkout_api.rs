//! Router-level tests for the PIX checkout flow.
//!
//! The payment gateway is a local axum server speaking the AbacatePay
//! envelope format; the storefront reaches it through `ABACATEPAY_BASE_URL`.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use open_bar_storefront::config::{AbacatePayConfig, StorefrontConfig};
use open_bar_storefront::middleware::session::session_layer;
use open_bar_storefront::state::AppState;
use open_bar_storefront::{app, routes};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

/// Gateway state: queued charge statuses (popped from the end) and a charge counter.
#[derive(Clone, Default)]
struct Gateway {
    statuses: Arc<Mutex<Vec<&'static str>>>,
    charges: Arc<AtomicUsize>,
}

impl Gateway {
    fn will_report(&self, status: &'static str) {
        self.statuses.lock().unwrap().push(status);
    }

    fn charges(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }
}

async fn create_customer() -> Json<Value> {
    Json(json!({ "data": { "id": "cust_1" }, "error": null }))
}

async fn create_pix(State(gateway): State<Gateway>) -> Json<Value> {
    let n = gateway.charges.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "data": {
            "id": format!("pix_char_{n}"),
            "brCode": "00020101021226950014br.gov.bcb.pix",
            "brCodeBase64": "data:image/png;base64,iVBORw0KGgo=",
            "expiresAt": "2030-01-01T00:00:00Z"
        },
        "error": null
    }))
}

async fn check_pix(State(gateway): State<Gateway>) -> Json<Value> {
    let status = gateway.statuses.lock().unwrap().pop().unwrap_or("PENDING");
    Json(json!({ "data": { "status": status }, "error": null }))
}

/// Serve the fake gateway on an ephemeral port and return its base URL.
async fn spawn_gateway(gateway: Gateway) -> String {
    let router = Router::new()
        .route("/customer/create", post(create_customer))
        .route("/pixQrCode/create", post(create_pix))
        .route("/pixQrCode/check", get(check_pix))
        .with_state(gateway);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(gateway_url: String) -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/open_bar_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        abacatepay: Some(AbacatePayConfig {
            api_key: SecretString::from("abc_test_key"),
            base_url: gateway_url,
            pix_expires_in: 3600,
        }),
        email: None,
        notion: None,
        viacep_base_url: "http://localhost:1".to_owned(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Minimal cookie-carrying client around `oneshot`.
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    async fn new(gateway: &Gateway) -> Self {
        let url = spawn_gateway(gateway.clone()).await;
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/open_bar_test")
            .unwrap();
        let state = AppState::new(config(url), pool).unwrap();
        Self {
            app: app(state, routes::routes(), session_layer(MemoryStore::default(), false)),
            cookie: None,
        }
    }

    async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_owned());
        }
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn get(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    async fn post(&mut self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    async fn post_empty(&mut self, uri: &str) -> (StatusCode, Value) {
        self.send("POST", uri, None).await
    }

    async fn fill_cart(&mut self) {
        let (status, _) = self
            .post(
                "/cart/services",
                json!({
                    "item": { "id": "open-bar", "title": "Open Bar Completo" },
                    "horario": "3",
                    "convidados": "50",
                    "bartenders": "1"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

fn customer() -> Value {
    json!({
        "name": "Ana Souza",
        "email": "ana@exemplo.com",
        "phone": "11999990000",
        "taxId": "52998224725"
    })
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let gateway = Gateway::default();
    let mut client = Client::new(&gateway).await;

    let (status, body) = client.post("/checkout/pix", customer()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(gateway.charges(), 0);
}

#[tokio::test]
async fn test_check_without_checkout_is_not_found() {
    let gateway = Gateway::default();
    let mut client = Client::new(&gateway).await;

    let (status, _) = client.post_empty("/checkout/pix/check").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirmed_payment_clears_cart() {
    let gateway = Gateway::default();
    let mut client = Client::new(&gateway).await;
    client.fill_cart().await;

    let (status, started) = client.post("/checkout/pix", customer()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["state"], "awaiting_payment");
    assert_eq!(started["pix"]["pixId"], "pix_char_1");
    assert_eq!(started["amountCents"], 85_000);

    // Still pending: the cart stays put
    let (status, pending) = client.post_empty("/checkout/pix/check").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["state"], "awaiting_payment");
    assert!(pending["message"].as_str().unwrap().contains("ainda não confirmado"));
    let (_, cart) = client.get("/cart").await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);

    gateway.will_report("PAID");
    let (status, confirmed) = client.post_empty("/checkout/pix/check").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["state"], "confirmed");
    assert_eq!(confirmed["completion"]["pixId"], "pix_char_1");
    assert_eq!(confirmed["completion"]["amount"], 85_000);

    let (_, cart) = client.get("/cart").await;
    assert_eq!(cart["lines"], json!([]));
}

#[tokio::test]
async fn test_retry_replaces_checkout_session() {
    let gateway = Gateway::default();
    let mut client = Client::new(&gateway).await;
    client.fill_cart().await;

    let (_, started) = client.post("/checkout/pix", customer()).await;

    // A live charge cannot be retried
    let (status, _) = client.post_empty("/checkout/pix/retry").await;
    assert_eq!(status, StatusCode::CONFLICT);

    gateway.will_report("EXPIRED");
    let (_, expired) = client.post_empty("/checkout/pix/check").await;
    assert_eq!(expired["state"], "expired");

    let (status, retried) = client.post_empty("/checkout/pix/retry").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retried["state"], "awaiting_payment");
    assert_eq!(retried["pix"]["pixId"], "pix_char_2");
    assert_ne!(retried["id"], started["id"]);
    assert_eq!(gateway.charges(), 2);

    // The visitor session now points at the new payment session
    let (status, current) = client.get("/checkout/pix").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["id"], retried["id"]);

    // The cart survives an expiry and a retry
    let (_, cart) = client.get("/cart").await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
}
