//! The identity provider capabilities the gate depends on.

use crate::claims::AccessClaims;
use crate::error::IdentityProviderError;
use crate::token::TokenBundle;
use async_trait::async_trait;

/// Trait for an OIDC identity provider client.
///
/// Implementations own all network access and token cryptography. Retrying,
/// if any, belongs here and not in callers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the URL of the provider's authorization endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the redirect URI is not a valid URL.
    fn authorization_url(
        &self,
        redirect_uri: &str,
        scope: &str,
    ) -> Result<String, IdentityProviderError>;

    /// Exchanges an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `TokenExchange` on network failure, an invalid code, or a
    /// malformed response.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        scope: &str,
    ) -> Result<TokenBundle, IdentityProviderError>;

    /// Validates an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenInvalid` if the token is expired, badly signed, or
    /// cannot be parsed.
    async fn decode_access_token(
        &self,
        access_token: &str,
    ) -> Result<AccessClaims, IdentityProviderError>;

    /// Revokes a refresh token at the provider.
    ///
    /// # Errors
    ///
    /// Returns `Revocation` if the provider could not be reached or refused.
    async fn revoke_refresh_token(&self, refresh_token: &str)
    -> Result<(), IdentityProviderError>;
}
