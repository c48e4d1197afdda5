//! Wire types: the response envelope, structured request errors, and the
//! token DTOs.

pub mod token;

use serde::{Deserialize, Serialize};

pub use token::{RefreshTokenChangeDto, RefreshTokenDto, ValidateTokenRequest};

/// Error slugs exposed on the wire.
pub const ERR_ACCESS_DENIED: &str = "access_denied";
pub const ERR_INSUFFICIENT: &str = "insufficient";
pub const ERR_OVERFLOW: &str = "overflow";
pub const ERR_INVALID_VALUE: &str = "invalid_value";
pub const ERR_INVALID_FORMAT: &str = "invalid_format";
pub const ERR_MISSING: &str = "missing";
pub const ERR_NOT_FOUND: &str = "not_found";
pub const ERR_CONFLICT: &str = "conflict";
pub const ERR_ACT_OF_GOD: &str = "act_of_god";

/// A structured request error: the slug plus, where applicable, the body
/// field, route parameter, or header it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestError {
    #[serde(rename = "error")]
    pub slug: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl RequestError {
    /// An error not tied to any part of the request.
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            field: None,
            param: None,
            header: None,
        }
    }

    /// An error about a body field, addressed JSON-pointer style.
    pub fn field(slug: &str, field: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            ..Self::new(slug)
        }
    }

    /// An error about a route parameter.
    pub fn param(slug: &str, param: &str) -> Self {
        Self {
            param: Some(param.to_string()),
            ..Self::new(slug)
        }
    }

    /// An error about a request header.
    pub fn header(slug: &str, header: &str) -> Self {
        Self {
            header: Some(header.to_string()),
            ..Self::new(slug)
        }
    }
}

/// The global response envelope: either results or errors, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<RefreshTokenDto>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RequestError>,
}

impl ApiResponse {
    /// A response carrying a single token.
    pub fn token(token: RefreshTokenDto) -> Self {
        Self {
            tokens: vec![token],
            ..Self::default()
        }
    }

    /// A response carrying one or more errors.
    pub fn errors(errors: Vec<RequestError>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }
}
