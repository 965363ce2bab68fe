//! Cart lines and the persisted cart store.
//!
//! The cart is a JSON array of [`CartLine`]s kept in some durable per-visitor
//! storage (the storefront uses the visitor's session). [`CartStore`] owns the
//! in-memory copy and writes the whole snapshot back after every mutation.
//!
//! Two rules shape the line list:
//! - drink lines are unique per drink id; adding the same drink again bumps
//!   its quantity
//! - service quote lines are never merged, each quote is its own line

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::drink::{DrinkCategory, DrinkId};
use crate::pricing::{self, BartenderTier, GuestTier, HoursTier, TierSelection};
use crate::types::Price;

/// Errors raised by [`CartStore`] operations.
#[derive(thiserror::Error, Debug)]
pub enum CartError {
    /// The backing storage failed to persist the cart.
    #[error("cart storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// No line at the given position.
    #[error("no cart line at index {index} (cart has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// Quantity changes only apply to drink lines.
    #[error("cart line {0} is not a drink")]
    NotADrink(usize),
    /// The cart could not be serialized.
    #[error("cart serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The service package a quote was made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Price caption shown on the package card ("a partir de ...").
    #[serde(default)]
    pub price: Option<String>,
}

/// A configured party-service quote. Immutable once in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuoteLine {
    pub item: ServiceItem,
    pub horario: HoursTier,
    pub convidados: GuestTier,
    pub bartenders: BartenderTier,
    pub valor_total: Price,
    pub valor_total_formatado: String,
}

impl ServiceQuoteLine {
    /// Build a quote line, pricing it from the three selections.
    #[must_use]
    pub fn new(
        item: ServiceItem,
        horario: HoursTier,
        convidados: GuestTier,
        bartenders: BartenderTier,
    ) -> Self {
        let total = pricing::price(&TierSelection {
            hours: Some(horario),
            guests: Some(convidados),
            bartenders: Some(bartenders),
        });
        Self {
            item,
            horario,
            convidados,
            bartenders,
            valor_total: total,
            valor_total_formatado: total.display(),
        }
    }
}

/// A catalog drink in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrinkLine {
    pub id: DrinkId,
    pub nome: String,
    #[serde(default)]
    pub imagem_url: Option<String>,
    #[serde(default)]
    pub categoria: Option<DrinkCategory>,
    pub quantity: u32,
}

/// One entry of the cart array, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartLine {
    Service(ServiceQuoteLine),
    Drink(DrinkLine),
}

impl CartLine {
    /// Display name of the line.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Service(s) => &s.item.title,
            Self::Drink(d) => &d.nome,
        }
    }

    /// Line total. Drinks are bundled into the service package and carry no
    /// price of their own.
    #[must_use]
    pub fn total(&self) -> Price {
        match self {
            Self::Service(s) => s.valor_total,
            Self::Drink(_) => Price::zero(),
        }
    }

    /// Units on the line (always 1 for a service quote).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        match self {
            Self::Service(_) => 1,
            Self::Drink(d) => d.quantity,
        }
    }
}

/// Durable storage for the serialized cart.
///
/// Implementations hold exactly one value: the JSON array written by the
/// last [`CartStore::save`].
pub trait CartStorage: Send + Sync {
    /// Storage-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the stored payload, `None` if nothing was ever written.
    fn read(&self) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

    /// Replace the stored payload.
    fn write(&self, payload: String) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

type Listener = Box<dyn Fn(&[CartLine]) + Send + Sync>;

/// The cart of one visitor, mirrored to a [`CartStorage`].
pub struct CartStore<S> {
    storage: S,
    lines: Vec<CartLine>,
    hydrated: bool,
    listeners: Vec<Listener>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create an empty, not yet hydrated store.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            lines: Vec::new(),
            hydrated: false,
            listeners: Vec::new(),
        }
    }

    /// Create a store and immediately [`load`](Self::load) it.
    pub async fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load().await;
        store
    }

    /// Read the stored cart.
    ///
    /// Never fails: a missing key, a storage error, malformed JSON or a
    /// payload that is not an array of lines all produce an empty cart.
    /// A successful read marks the store hydrated, which enables
    /// [`save`](Self::save). After a failed read the stored cart is unknown,
    /// so the store stays unhydrated and never writes over it.
    pub async fn load(&mut self) -> &[CartLine] {
        self.lines = match self.storage.read().await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable cart payload");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "cart storage read failed, starting empty");
                self.lines.clear();
                return &self.lines;
            }
        };
        self.hydrated = true;
        &self.lines
    }

    /// Write the current snapshot.
    ///
    /// Does nothing until the first [`load`](Self::load) has completed so an
    /// empty, unhydrated store can never overwrite a stored cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Serialize`] or [`CartError::Storage`].
    pub async fn save(&self) -> Result<(), CartError> {
        if !self.hydrated {
            return Ok(());
        }
        let payload = serde_json::to_string(&self.lines)?;
        self.storage
            .write(payload)
            .await
            .map_err(|e| CartError::Storage(Box::new(e)))
    }

    /// Register a listener called with the new snapshot after each mutation.
    pub fn subscribe(&mut self, listener: impl Fn(&[CartLine]) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    async fn commit(&self) -> Result<(), CartError> {
        self.save().await?;
        for listener in &self.listeners {
            listener(&self.lines);
        }
        Ok(())
    }

    /// Append a service quote. Identical quotes still get separate lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn add_service(&mut self, line: ServiceQuoteLine) -> Result<(), CartError> {
        self.lines.push(CartLine::Service(line));
        self.commit().await
    }

    /// Add one unit of `drink`, merging with an existing line for the same id.
    ///
    /// The incoming quantity is ignored: a new line starts at 1 and an
    /// existing one grows by 1. Returns the resulting line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn add_or_increment_drink(&mut self, drink: DrinkLine) -> Result<DrinkLine, CartError> {
        let existing = self.lines.iter_mut().find_map(|line| match line {
            CartLine::Drink(d) if d.id == drink.id => Some(d),
            _ => None,
        });

        let updated = if let Some(line) = existing {
            line.quantity = line.quantity.saturating_add(1);
            line.clone()
        } else {
            let line = DrinkLine {
                quantity: 1,
                ..drink
            };
            self.lines.push(CartLine::Drink(line.clone()));
            line
        };

        self.commit().await?;
        Ok(updated)
    }

    /// Set the quantity of the drink at `index`; `quantity < 1` removes the
    /// line instead.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`], [`CartError::NotADrink`] when a
    /// positive quantity targets a service line, or a persistence error.
    pub async fn update_quantity(&mut self, index: usize, quantity: i64) -> Result<(), CartError> {
        if quantity < 1 {
            return self.remove_at(index).await.map(|_| ());
        }

        let len = self.lines.len();
        match self.lines.get_mut(index) {
            None => return Err(CartError::IndexOutOfRange { index, len }),
            Some(CartLine::Service(_)) => return Err(CartError::NotADrink(index)),
            Some(CartLine::Drink(d)) => {
                d.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        }
        self.commit().await
    }

    /// Remove and return the line at `index`. Later lines shift down by one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] or a persistence error.
    pub async fn remove_at(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        let removed = self.lines.remove(index);
        self.commit().await?;
        Ok(removed)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.lines.clear();
        self.commit().await
    }

    /// Current lines.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether [`load`](Self::load) has completed.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Sum of drink quantities. Service lines are not counted.
    #[must_use]
    pub fn total_drink_count(&self) -> u32 {
        self.lines
            .iter()
            .filter_map(|line| match line {
                CartLine::Drink(d) => Some(d.quantity),
                CartLine::Service(_) => None,
            })
            .fold(0, u32::saturating_add)
    }

    /// Amount due for the cart.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::total).sum()
    }
}
