//! OIDC (OpenID Connect) identity provider configuration.
//!
//! The provider is addressed Keycloak-style: a server base URL plus a realm,
//! from which the issuer and the logout endpoint are derived.

use serde::{Deserialize, Serialize};

/// Configuration for the OIDC identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Clone, Serialize, Deserialize)]
pub struct OidcConfig {
    /// Base URL of the identity provider (e.g., "https://auth.example.com").
    server_url: String,
    /// Realm (tenant) name.
    realm: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// Space-separated OAuth2 scopes to request.
    /// Default: "openid"
    #[serde(default = "default_scope")]
    scope: String,
}

fn default_scope() -> String {
    "openid".to_string()
}

impl std::fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcConfig")
            .field("server_url", &self.server_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

impl OidcConfig {
    /// Creates a new OIDC configuration with the default scope.
    #[must_use]
    pub fn new(server_url: String, realm: String, client_id: String, client_secret: String) -> Self {
        Self {
            server_url,
            realm,
            client_id,
            client_secret,
            scope: default_scope(),
        }
    }

    /// Replaces the requested scope.
    #[must_use]
    pub fn with_scope(mut self, scope: String) -> Self {
        self.scope = scope;
        self
    }

    /// Returns the issuer URL, `{server_url}/realms/{realm}`.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        format!(
            "{}/realms/{}",
            self.server_url.trim_end_matches('/'),
            self.realm
        )
    }

    /// Returns the endpoint that ends a provider session given a refresh token.
    #[must_use]
    pub fn logout_url(&self) -> String {
        format!("{}/protocol/openid-connect/logout", self.issuer_url())
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the raw scope string.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }
}
