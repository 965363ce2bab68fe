//! Serial key of an admin account.
//!
//! Drink keys are human-chosen slugs and live next to their entity, see
//! [`crate::drink::DrinkId`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of `admin.admin_user`.
///
/// Serializes as a bare number so clients can send `"adminId": 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct AdminUserId(i32);

impl AdminUserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for AdminUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i32> for AdminUserId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<AdminUserId> for i32 {
    fn from(id: AdminUserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        let id = AdminUserId::new(42);
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("42"));
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
    }

    #[test]
    fn test_ordering_follows_key() {
        assert!(AdminUserId::new(2) > AdminUserId::from(1));
    }
}
