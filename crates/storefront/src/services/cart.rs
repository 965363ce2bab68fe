//! Cart persistence in the visitor's session.

use open_bar_core::{CartStorage, CartStore};
use tower_sessions::Session;

use crate::models::session_keys;

/// Stores the serialized cart under the `cart` session key.
#[derive(Clone)]
pub struct SessionCartStorage {
    session: Session,
}

impl SessionCartStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStorage {
    type Error = tower_sessions::session::Error;

    async fn read(&self) -> Result<Option<String>, Self::Error> {
        self.session.get::<String>(session_keys::CART).await
    }

    async fn write(&self, payload: String) -> Result<(), Self::Error> {
        self.session.insert(session_keys::CART, payload).await
    }
}

/// The visitor's cart, loaded from their session.
pub type SessionCart = CartStore<SessionCartStorage>;

/// Open the cart held in `session`.
pub async fn open_cart(session: Session) -> SessionCart {
    CartStore::open(SessionCartStorage::new(session)).await
}
