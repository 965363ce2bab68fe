//! Open Bar Core - Shared domain library.
//!
//! This crate provides the domain types and pure logic shared by every
//! Open Bar component:
//! - `storefront` - Public API (catalog, cart, quotes, PIX checkout)
//! - `admin` - Admin API (drink catalog and admin accounts)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains types, pure functions and traits - no network
//! I/O and no database access. Storage-dependent logic such as the cart is
//! written against the [`cart::CartStorage`] trait so each binary can plug
//! in its own backend.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, CPFs and roles
//! - [`pricing`] - Party-service quote calculator
//! - [`cart`] - Cart lines, merge rules and the persisted cart store
//! - [`drink`] - Drink catalog entities and validated drafts
//! - [`pix`] - PIX payment status and customer data
//! - [`config`] - Environment helpers shared by the binaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod drink;
pub mod pix;
pub mod pricing;
pub mod types;

pub use cart::{CartError, CartLine, CartStorage, CartStore, DrinkLine, ServiceItem, ServiceQuoteLine};
pub use drink::{Characteristic, Drink, DrinkCategory, DrinkDraft, DrinkError, DrinkForm, DrinkId};
pub use pix::{CustomerError, CustomerInfo, PixStatus};
pub use pricing::{BartenderTier, GuestTier, HoursTier, TierSelection, price};
pub use types::*;
