//! # Tokens Core
//!
//! Core domain and service layer for the refresh-token service. This crate
//! contains the token record model, the storage contract with its in-memory
//! implementation, the signed-envelope service, and the error types shared
//! across the workspace.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::token::{
    RefreshToken, RefreshTokenChange, NOT_BEFORE_GRACE_HOURS, NUM_TOKEN_RESULTS,
    REFRESH_TOKEN_EXPIRY_DAYS,
};
pub use errors::{InvalidTokenCause, TokenError, TokenResult};
pub use repositories::token::{MemoryTokenRepository, TokenRepository};
pub use services::token::{Claims, RsaKeyManager, TokenService, TokenServiceConfig};
