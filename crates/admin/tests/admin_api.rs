//! Router-level tests for the admin functions.
//!
//! Only requests that are settled before the first query are exercised, so
//! the lazily connected pool never dials a database.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use open_bar_admin::config::AdminConfig;
use open_bar_admin::middleware::session::session_layer;
use open_bar_admin::state::AppState;
use open_bar_admin::{app, routes};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

fn test_app() -> Router {
    let config = AdminConfig {
        database_url: SecretString::from("postgres://localhost/open_bar_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        base_url: "http://localhost:3001".to_owned(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/open_bar_test")
        .unwrap();
    app(
        AppState::new(config, pool),
        routes::routes(),
        session_layer(MemoryStore::default(), false),
    )
}

async fn post(uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_echoes_request_id() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn unknown_action_is_a_json_400() {
    let (status, body) = post(
        "/functions/admin-auth",
        &json!({ "action": "reset_everything" }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Requisição inválida"));
}

#[tokio::test]
async fn login_requires_email_and_password() {
    let (status, body) = post(
        "/functions/admin-auth",
        &json!({ "action": "login", "email": "gerente@openbar.com.br" }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email e senha são obrigatórios");
}

#[tokio::test]
async fn session_without_login_is_401() {
    let (status, body) = post("/functions/admin-auth", r#"{"action":"session"}"#).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn actions_without_actor_are_401() {
    let (status, _) = post("/functions/admin-auth", r#"{"action":"get_admins"}"#).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post("/functions/admin-drinks", r#"{"action":"list"}"#).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Não autenticado");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (status, body) = post("/functions/admin-drinks", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
