//! Admin session state.
//!
//! After a successful login the admin and an absolute expiry are stored
//! under [`keys::ADMIN_SESSION`]. The expiry is checked on every load and an
//! expired entry is removed instead of being returned.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::admin_user::AdminUser;

/// How long a login stays valid.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Session-stored admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub admin: AdminUser,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Start a session for `admin` at `now`.
    #[must_use]
    pub fn start(admin: AdminUser, now: DateTime<Utc>) -> Self {
        Self {
            admin,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        }
    }

    /// Whether the session is no longer valid at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for the logged-in admin and the session expiry.
    pub const ADMIN_SESSION: &str = "admin_session";
}
