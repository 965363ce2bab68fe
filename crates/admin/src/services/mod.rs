//! Business logic for the admin API.
//!
//! Services take their storage as a generic [`AdminDirectory`] or
//! [`DrinkCatalog`] so handlers pass the `PostgreSQL` repositories and tests
//! pass the in-memory stores from `test_support`.
//!
//! [`AdminDirectory`]: crate::db::AdminDirectory
//! [`DrinkCatalog`]: crate::db::DrinkCatalog

pub mod access;
pub mod admin_users;
pub mod auth;
pub mod drinks;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support;

pub use access::{AccessError, acting_admin, authorize};
pub use admin_users::AdminUserError;
pub use auth::AuthError;
pub use drinks::CatalogError;
