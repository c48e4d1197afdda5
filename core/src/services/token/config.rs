//! Configuration for the token service.

use crate::errors::TokenResult;

use super::key_manager::RsaKeyManager;

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Issuer written into every minted envelope and pinned during
    /// validation.
    pub issuer: String,
    /// Path to the PEM-encoded RSA private key used for signing.
    pub private_key_path: String,
    /// Path to the PEM-encoded RSA public key used for verification.
    pub public_key_path: String,
}

impl TokenServiceConfig {
    /// Creates config from environment variables.
    ///
    /// Reads `TOKENS_ISSUER`, `JWT_PRIVATE_KEY`, and `JWT_PUBLIC_KEY`.
    pub fn from_env() -> Self {
        Self {
            issuer: std::env::var("TOKENS_ISSUER").unwrap_or_else(|_| "tokens".to_string()),
            private_key_path: std::env::var("JWT_PRIVATE_KEY")
                .unwrap_or_else(|_| "keys/jwt_private_key.pem".to_string()),
            public_key_path: std::env::var("JWT_PUBLIC_KEY")
                .unwrap_or_else(|_| "keys/jwt_public_key.pem".to_string()),
        }
    }

    /// Loads the key manager from the configured key paths.
    pub fn load_key_manager(&self) -> TokenResult<RsaKeyManager> {
        RsaKeyManager::new(&self.private_key_path, &self.public_key_path)
    }
}
