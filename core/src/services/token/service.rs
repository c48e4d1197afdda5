//! Main token service implementation.

use chrono::TimeDelta;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::entities::token::{
    RefreshToken, NOT_BEFORE_GRACE_HOURS, REFRESH_TOKEN_EXPIRY_DAYS,
};
use crate::errors::{InvalidTokenCause, TokenError, TokenResult};
use crate::repositories::token::r#trait::TokenRepository;

use super::config::TokenServiceConfig;
use super::key_manager::RsaKeyManager;

/// Claims carried by a signed envelope.
///
/// `jti` holds the record's ID and is the only claim consulted when the
/// envelope is resolved back to a record; the rest exist so the envelope is
/// self-describing on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the profile ID)
    pub sub: String,

    /// Audience (the client ID)
    pub aud: String,

    /// Issuer (the configured service identifier)
    pub iss: String,

    /// The record's ID
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,
}

impl Claims {
    /// Builds the claims for `token`: issued at the record's creation
    /// instant, expiring fourteen days later, valid from one hour before.
    pub fn for_token(token: &RefreshToken, issuer: &str) -> Self {
        let issued = token.created_at;
        Self {
            sub: token.profile_id.clone(),
            aud: token.client_id.clone(),
            iss: issuer.to_string(),
            jti: token.id.clone(),
            iat: issued.timestamp(),
            exp: (issued + TimeDelta::days(REFRESH_TOKEN_EXPIRY_DAYS)).timestamp(),
            nbf: (issued - TimeDelta::hours(NOT_BEFORE_GRACE_HOURS)).timestamp(),
        }
    }
}

/// Service for minting and validating signed refresh-token envelopes.
pub struct TokenService<R: TokenRepository> {
    repository: R,
    issuer: String,
    keys: RsaKeyManager,
    validation: Validation,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service, loading keys from the configured paths.
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for record lookups
    /// * `config` - Issuer and key material configuration
    pub fn new(repository: R, config: TokenServiceConfig) -> TokenResult<Self> {
        let keys = config.load_key_manager()?;
        Ok(Self::with_keys(repository, config.issuer, keys))
    }

    /// Creates a token service with an already-loaded key manager.
    pub fn with_keys(repository: R, issuer: String, keys: RsaKeyManager) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = vec![
            Algorithm::RS256,
            Algorithm::RS384,
            Algorithm::RS512,
            Algorithm::PS256,
            Algorithm::PS384,
            Algorithm::PS512,
        ];
        validation.set_issuer(&[issuer.as_str()]);
        // the audience claim carries the client id, which varies per token,
        // so it cannot be pinned here
        validation.validate_aud = false;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            repository,
            issuer,
            keys,
            validation,
        }
    }

    /// Returns the underlying record store.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the fingerprint envelopes are currently minted under.
    pub fn key_fingerprint(&self) -> &str {
        self.keys.fingerprint()
    }

    /// Mints the signed envelope for `token`, with the public key's
    /// fingerprint written into the header.
    pub fn create_jwt(&self, token: &RefreshToken) -> TokenResult<String> {
        let claims = Claims::for_token(token, &self.issuer);
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.keys.fingerprint().to_string());

        encode(&header, &claims, self.keys.encoding_key())
            .map_err(|err| TokenError::key(format!("failed to sign envelope: {err}")))
    }

    /// Validates a presented envelope and resolves it to its record.
    ///
    /// The envelope's algorithm must be an RSA variant and its key id must
    /// name the configured public key before the signature and temporal
    /// claims are checked. A verified envelope whose record is missing
    /// reports plain `InvalidToken`, so callers cannot distinguish a bad
    /// envelope from an unknown one. Validation never marks the record used;
    /// redemption is the caller's explicit
    /// [`use_token`](TokenRepository::use_token) call.
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshToken)` - The live record behind the envelope
    /// * `Err(TokenError::InvalidToken)` - The envelope failed any check
    /// * `Err(TokenError::TokenRevoked)` - The record was revoked
    /// * `Err(TokenError::TokenUsed)` - The record was already redeemed
    pub async fn validate(&self, envelope: &str) -> TokenResult<RefreshToken> {
        let header = decode_header(envelope)
            .map_err(|_| TokenError::invalid(InvalidTokenCause::Malformed))?;

        match header.alg {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => {}
            other => {
                return Err(TokenError::invalid(
                    InvalidTokenCause::UnexpectedSigningMethod(format!("{other:?}")),
                ));
            }
        }
        if header.kid.as_deref() != Some(self.keys.fingerprint()) {
            return Err(TokenError::invalid(InvalidTokenCause::UnknownSigningKey));
        }

        let data = decode::<Claims>(envelope, self.keys.decoding_key(), &self.validation)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    TokenError::invalid(InvalidTokenCause::Expired)
                }
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => {
                    TokenError::invalid(InvalidTokenCause::NotYetValid)
                }
                _ => TokenError::invalid(InvalidTokenCause::Malformed),
            })?;

        let record = match self.repository.get_token(&data.claims.jti).await {
            Ok(record) => record,
            Err(TokenError::TokenNotFound) => {
                return Err(TokenError::invalid(InvalidTokenCause::UnknownToken));
            }
            Err(err) => return Err(err),
        };

        if record.revoked {
            return Err(TokenError::TokenRevoked);
        }
        if record.used {
            return Err(TokenError::TokenUsed);
        }
        Ok(record)
    }
}
