//! Refresh-token record and patch types.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of records returned when listing tokens for a profile.
pub const NUM_TOKEN_RESULTS: usize = 25;

/// Signed-envelope expiration time (14 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 14;

/// Grace period before a freshly minted envelope becomes valid (1 hour)
pub const NOT_BEFORE_GRACE_HOURS: i64 = 1;

/// A refresh token record: the server-side representation of a long-lived,
/// single-use credential that can be redeemed for a new access credential.
///
/// Records are never deleted; expiry is enforced by the signed envelope's
/// temporal claims, and `revoked`/`used` only ever transition to `true`
/// through the service surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the token (a UUID, assigned at creation)
    pub id: String,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Provenance tag recording what produced the token
    pub created_from: String,

    /// Scopes the token grants. Opaque to this service; order is preserved.
    pub scopes: Vec<String>,

    /// Profile the token belongs to
    pub profile_id: String,

    /// Client the token was issued to
    pub client_id: String,

    /// Account the token belongs to
    pub account_id: String,

    /// Whether the token has been administratively invalidated
    pub revoked: bool,

    /// Whether the token has been consumed by a redemption
    pub used: bool,
}

impl Default for RefreshToken {
    fn default() -> Self {
        Self {
            id: String::new(),
            // the epoch marks a record that has not been stamped yet
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            created_from: String::new(),
            scopes: Vec::new(),
            profile_id: String::new(),
            client_id: String::new(),
            account_id: String::new(),
            revoked: false,
            used: false,
        }
    }
}

impl RefreshToken {
    /// Returns a copy of the record with every empty property that has a
    /// default filled in: a fresh random UUID for `id` and the current
    /// instant (truncated to millisecond precision, which is all the storage
    /// backends keep) for `created_at`.
    #[must_use]
    pub fn fill_defaults(self) -> RefreshToken {
        let mut res = self;
        if res.id.is_empty() {
            res.id = Uuid::new_v4().to_string();
        }
        if res.created_at == DateTime::<Utc>::UNIX_EPOCH {
            let now = Utc::now();
            res.created_at = now
                .duration_trunc(TimeDelta::milliseconds(1))
                .unwrap_or(now);
        }
        res
    }

    /// Returns a copy of the record with the mutations carried by `change`
    /// applied. Filter fields of `change` are not consulted; matching is the
    /// storage backend's job.
    #[must_use]
    pub fn apply_change(self, change: &RefreshTokenChange) -> RefreshToken {
        let mut res = self;
        if let Some(revoked) = change.revoked {
            res.revoked = revoked;
        }
        if let Some(used) = change.used {
            res.used = used;
        }
        res
    }
}

/// A change to one or more [`RefreshToken`]s.
///
/// The non-empty filter fields select the records to update, combined with
/// logical AND. `revoked` and `used` carry the new values; `None` means the
/// property is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenChange {
    /// Match the token with exactly this ID
    pub id: String,

    /// Match all tokens with this profile ID
    pub profile_id: String,

    /// Match all tokens with this client ID
    pub client_id: String,

    /// Match all tokens with this account ID
    pub account_id: String,

    /// New value for the `revoked` property, if any
    pub revoked: Option<bool>,

    /// New value for the `used` property, if any
    pub used: Option<bool>,
}

impl RefreshTokenChange {
    /// Returns true if applying the change would not update any property on
    /// the matching records.
    pub fn is_empty(&self) -> bool {
        self.revoked.is_none() && self.used.is_none()
    }

    /// Returns true if at least one filter field constrains the match set.
    /// A change without a filter is a programming error and is rejected by
    /// every storage backend.
    pub fn has_filter(&self) -> bool {
        !self.id.is_empty()
            || !self.profile_id.is_empty()
            || !self.client_id.is_empty()
            || !self.account_id.is_empty()
    }

    /// Returns true if `token` is selected by every non-empty filter field.
    pub fn matches(&self, token: &RefreshToken) -> bool {
        if !self.id.is_empty() && self.id != token.id {
            return false;
        }
        if !self.profile_id.is_empty() && self.profile_id != token.profile_id {
            return false;
        }
        if !self.client_id.is_empty() && self.client_id != token.client_id {
            return false;
        }
        if !self.account_id.is_empty() && self.account_id != token.account_id {
            return false;
        }
        true
    }
}
