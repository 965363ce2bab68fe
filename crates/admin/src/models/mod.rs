//! Domain models for the admin API.

pub mod admin_user;
pub mod session;

pub use admin_user::{AdminUser, AdminUserChanges, AdminUserData, NewAdminUser};
pub use session::{AdminSession, keys as session_keys};
