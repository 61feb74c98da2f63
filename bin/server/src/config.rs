//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`OidcConfig`](session_gate_access::OidcConfig) for identity
//! provider configuration.

use serde::Deserialize;
use session_gate_access::OidcConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Externally visible base URL (e.g., "https://app.example.com").
    /// When unset, the callback URL is derived from each request's host.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Session cookie configuration.
    pub session: SessionConfig,

    /// OIDC identity provider configuration.
    pub oidc: OidcConfig,
}

/// Session-related configuration.
#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    /// 32-byte cookie encryption key, URL-safe base64.
    pub encryption_key: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("encryption_key", &"<redacted>")
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Nested fields use `__` as separator, e.g. `OIDC__CLIENT_ID` or
    /// `SESSION__ENCRYPTION_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::default())
    }

    fn from_source(env: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
