//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (database)
//!
//! # Catalog
//! GET  /drinks                      - Drink list (?categoria=&destaque=true)
//! GET  /drinks/{id}                 - Drink detail
//!
//! # Cart (session-backed JSON)
//! GET  /cart                        - Cart snapshot
//! POST /cart/services               - Add a service quote
//! POST /cart/drinks                 - Add or increment a drink
//! POST /cart/update                 - Set a drink quantity
//! POST /cart/remove                 - Remove a line
//! POST /cart/clear                  - Empty the cart
//! GET  /cart/count                  - Drink count badge
//! POST /quote/price                 - Price a tier selection
//!
//! # Checkout
//! GET  /checkout/pix                - Current payment session
//! POST /checkout/pix                - Start PIX payment for the cart
//! POST /checkout/pix/check          - Check whether the PIX was paid
//! POST /checkout/pix/retry          - New PIX code after failure/expiry
//!
//! # Public functions (CORS-open)
//! POST /functions/create-pix-payment
//! POST /functions/check-pix-payment-status
//! POST /functions/send-quote-email
//! POST /functions/send-order-confirmation
//! POST /functions/create-notion-event
//! POST /functions/notify-home-visit
//!
//! # Misc
//! GET  /cep/{cep}                   - Address lookup
//! ```

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod functions;
pub mod quote;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::middleware::{api_rate_limiter, functions_rate_limiter};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{id}", get(catalog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/services", post(cart::add_service))
        .route("/drinks", post(cart::add_drink))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/pix", get(checkout::show).post(checkout::start))
        .route("/pix/check", post(checkout::check))
        .route("/pix/retry", post(checkout::retry))
}

/// Create the public function routes router.
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/create-pix-payment", post(functions::create_pix_payment))
        .route(
            "/check-pix-payment-status",
            post(functions::check_pix_payment_status),
        )
        .route("/send-quote-email", post(functions::send_quote_email))
        .route(
            "/send-order-confirmation",
            post(functions::send_order_confirmation),
        )
        .route("/create-notion-event", post(functions::create_notion_event))
        .route("/notify-home-visit", post(functions::notify_home_visit))
        .layer(CorsLayer::permissive())
}

/// Create all routes for the storefront, without rate limiting.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/drinks", catalog_routes())
        .nest("/cart", cart_routes())
        .route("/quote/price", post(quote::price_quote))
        .nest("/checkout", checkout_routes())
        .nest("/functions", function_routes())
        .route("/cep/{cep}", get(address::lookup))
}

/// Create all routes with per-IP rate limits applied.
///
/// Functions that send email or hit the payment gateway get the stricter
/// limiter.
pub fn rate_limited_routes() -> Router<AppState> {
    Router::new()
        .nest("/drinks", catalog_routes())
        .nest("/cart", cart_routes())
        .route("/quote/price", post(quote::price_quote))
        .route("/cep/{cep}", get(address::lookup))
        .layer(api_rate_limiter())
        .nest(
            "/checkout",
            checkout_routes().layer(functions_rate_limiter()),
        )
        .nest(
            "/functions",
            function_routes().layer(functions_rate_limiter()),
        )
}
