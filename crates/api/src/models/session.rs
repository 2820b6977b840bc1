//! Bearer-token sessions.

use chrono::{DateTime, Utc};

use anar_shop_core::{Email, Role, UserId};

/// The authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address at sign-in time.
    pub email: Email,
    /// User's role at sign-in time.
    pub role: Role,
}

impl CurrentUser {
    /// Whether the caller may use admin endpoints.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A stored session. Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Hex digest of the bearer token.
    pub token_hash: String,
    /// Who the token belongs to.
    pub user: CurrentUser,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
