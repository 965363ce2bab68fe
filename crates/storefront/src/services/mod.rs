//! Business logic and third-party integrations for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart persistence in the visitor session
//! - `checkout` - PIX payment session orchestration
//! - `pix` / `abacatepay` - Payment gateway seam and its client
//! - `email` - Quote, order and visit emails (SMTP)
//! - `notion` - Event CRM pages
//! - `viacep` - Postal code lookup

pub mod abacatepay;
pub mod cart;
pub mod checkout;
pub mod email;
pub mod notion;
pub mod pix;
pub mod viacep;

pub use abacatepay::AbacatePayClient;
pub use cart::{SessionCart, SessionCartStorage, open_cart};
pub use checkout::{CheckoutService, OrderConfirmation, OrderNotifier};
pub use email::EmailService;
pub use notion::NotionClient;
pub use viacep::ViaCepClient;
