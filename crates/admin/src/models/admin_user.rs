//! Admin user domain types.
//!
//! [`AdminUser`] never carries the password hash, so it can be serialized
//! straight into API responses and the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use open_bar_core::{AdminRole, AdminUserId, Cpf, Email};

/// An admin account as exposed to the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Full name, shown in the admin UI.
    #[serde(rename = "nome_completo")]
    pub full_name: String,
    /// Brazilian taxpayer id (11 digits).
    pub cpf: Cpf,
    /// Login email, lowercased.
    pub email: Email,
    /// Permission level.
    pub role: AdminRole,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Raw `userData` payload of the create and update actions.
///
/// Every field is optional on the wire; creation checks that the required
/// ones are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdminUserData {
    pub nome_completo: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub role: Option<AdminRole>,
    pub password: Option<String>,
}

/// A validated admin account ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub full_name: String,
    pub cpf: Cpf,
    pub email: Email,
    pub role: AdminRole,
    pub password_hash: String,
}

/// Validated partial update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct AdminUserChanges {
    pub full_name: Option<String>,
    pub cpf: Option<Cpf>,
    pub email: Option<Email>,
    pub role: Option<AdminRole>,
    pub password_hash: Option<String>,
}

impl AdminUserChanges {
    /// Apply these changes to `user` in memory.
    pub fn apply(&self, user: &mut AdminUser) {
        if let Some(name) = &self.full_name {
            user.full_name.clone_from(name);
        }
        if let Some(cpf) = &self.cpf {
            user.cpf = cpf.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}
