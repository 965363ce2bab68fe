//! Values kept in the visitor's session.
//!
//! Nothing here is authentication state: the storefront has no customer
//! accounts, so the session only carries the cart snapshot and a pointer to
//! the current checkout attempt.

/// Session keys used by the storefront.
pub mod keys {
    /// Serialized cart array (a JSON string, see `open_bar_core::cart`).
    pub const CART: &str = "cart";

    /// Id of the visitor's current PIX payment session.
    pub const CHECKOUT_ID: &str = "checkout_id";
}
