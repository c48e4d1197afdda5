//! Request and response representations of refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tokens_core::domain::entities::token::{RefreshToken, RefreshTokenChange};

/// Wire representation of a refresh-token record.
///
/// `token` carries the signed envelope and is only populated in create
/// responses; the envelope is never stored, so it cannot be echoed later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshTokenDto {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "createdFrom", default)]
    pub created_from: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,

    #[serde(rename = "profileID", default)]
    pub profile_id: String,

    #[serde(rename = "clientID", default)]
    pub client_id: String,

    #[serde(rename = "accountID", default)]
    pub account_id: String,

    #[serde(default)]
    pub revoked: bool,

    #[serde(default)]
    pub used: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl RefreshTokenDto {
    /// Builds the wire form of a stored record.
    pub fn from_record(record: &RefreshToken) -> Self {
        Self {
            id: record.id.clone(),
            created_at: Some(record.created_at),
            created_from: record.created_from.clone(),
            scopes: record.scopes.clone(),
            profile_id: record.profile_id.clone(),
            client_id: record.client_id.clone(),
            account_id: record.account_id.clone(),
            revoked: record.revoked,
            used: record.used,
            token: None,
        }
    }

    /// Builds the wire form of a freshly created record, envelope included.
    pub fn with_envelope(record: &RefreshToken, envelope: String) -> Self {
        Self {
            token: Some(envelope),
            ..Self::from_record(record)
        }
    }
}

impl From<RefreshTokenDto> for RefreshToken {
    fn from(dto: RefreshTokenDto) -> Self {
        Self {
            id: dto.id,
            created_at: dto.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            created_from: dto.created_from,
            scopes: dto.scopes,
            profile_id: dto.profile_id,
            client_id: dto.client_id,
            account_id: dto.account_id,
            revoked: dto.revoked,
            used: dto.used,
        }
    }
}

/// Body of a PATCH request: the tri-state mutations. Filters come from the
/// route, never the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshTokenChangeDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<bool>,
}

impl RefreshTokenChangeDto {
    /// Builds the core change targeting the record with `id`.
    pub fn into_change(self, id: String) -> RefreshTokenChange {
        RefreshTokenChange {
            id,
            revoked: self.revoked,
            used: self.used,
            ..Default::default()
        }
    }
}

/// Body of a validation request: the signed envelope string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateTokenRequest {
    pub token: String,
}
