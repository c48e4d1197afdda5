//! Server configuration loaded from the environment.

use tokens_core::services::token::TokenServiceConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Path the token routes are mounted under
    pub base_path: String,
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Issuer and key material for the envelope service
    pub tokens: TokenServiceConfig,
}

impl ApiConfig {
    /// Loads configuration from environment variables, with development
    /// defaults for everything but the database URL.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(4001),
            base_path: std::env::var("BASE_PATH").unwrap_or_else(|_| "/v1".to_string()),
            database_url: std::env::var("PG_DB").unwrap_or_default(),
            tokens: TokenServiceConfig::from_env(),
        }
    }
}
