//! Admin roles and the permissions they grant.
//!
//! [`AdminRole::allows`] is the single authorization table. The admin API
//! consults it before every privileged action, and the login payload carries
//! [`AdminRole::permissions`] so a UI can hide controls it would reject.

use serde::{Deserialize, Serialize};

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin account management.
    Manager,
    /// Can edit the drink catalog, no account management.
    Planner,
    /// Read-only access.
    Viewer,
}

/// A privileged capability checked by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Read the drink catalog.
    ViewCatalog,
    /// Create, update or delete drinks.
    EditCatalog,
    /// List, create, update or delete admin accounts.
    ManageAdmins,
}

impl Permission {
    /// Every permission, in display order.
    pub const ALL: [Self; 3] = [Self::ViewCatalog, Self::EditCatalog, Self::ManageAdmins];
}

impl AdminRole {
    /// Whether this role grants `permission`.
    #[must_use]
    pub const fn allows(self, permission: Permission) -> bool {
        match self {
            Self::Manager => true,
            Self::Planner => matches!(
                permission,
                Permission::ViewCatalog | Permission::EditCatalog
            ),
            Self::Viewer => matches!(permission, Permission::ViewCatalog),
        }
    }

    /// All permissions granted by this role.
    #[must_use]
    pub fn permissions(self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.allows(*p))
            .collect()
    }

    /// Human label used in emails and error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Manager => "Gerente",
            Self::Planner => "Planejador",
            Self::Viewer => "Visualizador",
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manager => write!(f, "manager"),
            Self::Planner => write!(f, "planner"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manager" => Ok(Self::Manager),
            "planner" => Ok(Self::Planner),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}
