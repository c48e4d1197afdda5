//! Error types shared by the storage backends, the token service, and the
//! HTTP surface. Each variant is a sentinel callers can match on; the HTTP
//! adapter is the only layer that turns them into wire slugs.

use std::fmt;

use thiserror::Error;

/// Why a presented envelope failed validation.
///
/// The cause is carried for logs and tests; the wire surface reports every
/// invalid envelope identically so callers cannot probe which check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTokenCause {
    /// The envelope's algorithm header is not an RSA variant.
    UnexpectedSigningMethod(String),
    /// The envelope's key id does not match the configured public key.
    UnknownSigningKey,
    /// The envelope's expiry claim is in the past.
    Expired,
    /// The envelope's not-before claim is in the future.
    NotYetValid,
    /// The envelope verified but its identifier claim has no record behind it.
    UnknownToken,
    /// The envelope could not be parsed or its signature did not verify.
    Malformed,
}

impl fmt::Display for InvalidTokenCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedSigningMethod(alg) => {
                write!(f, "unexpected signing method {alg}")
            }
            Self::UnknownSigningKey => write!(f, "unknown signing key"),
            Self::Expired => write!(f, "token expired"),
            Self::NotYetValid => write!(f, "token not yet valid"),
            Self::UnknownToken => write!(f, "no record for token"),
            Self::Malformed => write!(f, "malformed token"),
        }
    }
}

/// Errors produced by the token lifecycle kernel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token not found")]
    TokenNotFound,

    #[error("token already exists")]
    TokenAlreadyExists,

    #[error("token already used")]
    TokenUsed,

    #[error("token revoked")]
    TokenRevoked,

    #[error("invalid token: {cause}")]
    InvalidToken { cause: InvalidTokenCause },

    #[error("token change has mutations but no filter")]
    NoChangeFilter,

    #[error("key error: {message}")]
    Key { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl TokenError {
    /// Wraps a validation failure cause.
    pub fn invalid(cause: InvalidTokenCause) -> Self {
        Self::InvalidToken { cause }
    }

    /// Wraps a backend I/O failure.
    pub fn storage(err: impl fmt::Display) -> Self {
        Self::Storage {
            message: err.to_string(),
        }
    }

    /// Wraps a cryptographic setup failure.
    pub fn key(err: impl fmt::Display) -> Self {
        Self::Key {
            message: err.to_string(),
        }
    }
}

pub type TokenResult<T> = Result<T, TokenError>;
