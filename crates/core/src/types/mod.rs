//! Core types for Open Bar.
//!
//! Validated newtypes shared by the storefront and admin APIs.

pub mod cpf;
pub mod email;
pub mod id;
pub mod price;
pub mod role;

pub use cpf::{Cpf, CpfError};
pub use email::{Email, EmailError};
pub use id::AdminUserId;
pub use price::Price;
pub use role::{AdminRole, Permission};
