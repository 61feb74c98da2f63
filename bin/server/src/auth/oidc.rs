//! OIDC client implementation using the openidconnect crate.
//!
//! Discovery and authorization URLs go through `openidconnect`. The token,
//! logout, and JWKS endpoints are called directly with `reqwest` because the
//! provider's token response and logout endpoint carry fields the standard
//! types do not model. Access tokens are verified with `jsonwebtoken`.

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use openidconnect::core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata};
use openidconnect::{ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, RedirectUrl, Scope};
use rootcause::prelude::Report;
use session_gate_access::{
    AccessClaims, AccessTokenPayload, IdentityProvider, IdentityProviderError, OidcConfig,
    TokenBundle,
};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Timeout for every call to the provider.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum time between JWKS refetches triggered by unknown key IDs.
const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// OIDC client for authenticating users.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    issuer: String,
    token_url: String,
    jwks_url: String,
    logout_url: String,
    http_client: reqwest::Client,
    jwks: RwLock<CachedJwks>,
}

struct CachedJwks {
    keys: JwkSet,
    /// Time of the last fetch attempt, successful or not. `None` lets the
    /// next unknown key ID refetch immediately.
    fetched_at: Option<Instant>,
}

impl CachedJwks {
    fn is_fresh(&self) -> bool {
        self.fetched_at
            .is_some_and(|at| at.elapsed() < JWKS_REFRESH_INTERVAL)
    }
}

impl OidcClient {
    /// Creates a new OIDC client by discovering the provider metadata and
    /// fetching its signing keys.
    pub async fn discover(config: OidcConfig) -> Result<Self, Report<IdentityProviderError>> {
        let issuer = config.issuer_url();
        let issuer_url =
            IssuerUrl::new(issuer.clone()).map_err(|e| IdentityProviderError::Configuration {
                reason: format!("invalid issuer URL: {e}"),
            })?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| IdentityProviderError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| IdentityProviderError::Discovery {
                reason: format!("failed to discover provider: {e}"),
            })?;

        let token_url = provider_metadata
            .token_endpoint()
            .ok_or_else(|| IdentityProviderError::Discovery {
                reason: "provider metadata has no token endpoint".to_string(),
            })?
            .url()
            .to_string();
        let jwks_url = provider_metadata.jwks_uri().url().to_string();

        let keys = fetch_jwks(&http_client, &jwks_url).await?;
        info!(issuer = %issuer, keys = keys.keys.len(), "discovered identity provider");

        Ok(Self {
            client_id: ClientId::new(config.client_id().to_string()),
            client_secret: ClientSecret::new(config.client_secret().to_string()),
            logout_url: config.logout_url(),
            provider_metadata,
            issuer,
            token_url,
            jwks_url,
            http_client,
            jwks: RwLock::new(CachedJwks {
                keys,
                fetched_at: Some(Instant::now()),
            }),
        })
    }

    /// Looks up a signing key, refetching the key set if the provider may
    /// have rotated keys since the last attempt.
    ///
    /// Attempts are spaced by `JWKS_REFRESH_INTERVAL` whether they succeed or
    /// fail, and concurrent misses share one attempt.
    async fn signing_key(&self, kid: &str) -> Result<Jwk, IdentityProviderError> {
        if let Some(jwk) = self.jwks.read().await.keys.find(kid).cloned() {
            return Ok(jwk);
        }

        let mut cached = self.jwks.write().await;
        if let Some(jwk) = cached.keys.find(kid) {
            return Ok(jwk.clone());
        }
        if cached.is_fresh() {
            return Err(unknown_key(kid));
        }
        cached.fetched_at = Some(Instant::now());

        debug!(kid, "unknown signing key, refetching JWKS");
        cached.keys = fetch_jwks(&self.http_client, &self.jwks_url)
            .await
            .map_err(|e| IdentityProviderError::TokenInvalid {
                reason: e.to_string(),
            })?;

        cached.keys.find(kid).cloned().ok_or_else(|| unknown_key(kid))
    }
}

#[async_trait]
impl IdentityProvider for OidcClient {
    fn authorization_url(
        &self,
        redirect_uri: &str,
        scope: &str,
    ) -> Result<String, IdentityProviderError> {
        let redirect_url = RedirectUrl::new(redirect_uri.to_string()).map_err(|e| {
            IdentityProviderError::Configuration {
                reason: format!("invalid redirect URI: {e}"),
            }
        })?;

        let client = CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(redirect_url);

        let mut auth_request = client.authorize_url(
            CoreAuthenticationFlow::AuthorizationCode,
            CsrfToken::new_random,
            Nonce::new_random,
        );

        // `openid` is always requested by the authentication flow.
        for scope in scope.split_whitespace().filter(|s| *s != "openid") {
            auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
        }

        // State and nonce are not kept, so the callback is not CSRF-bound.
        let (auth_url, _csrf_token, _nonce) = auth_request.url();
        Ok(auth_url.to_string())
    }

    #[instrument(skip_all)]
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        scope: &str,
    ) -> Result<TokenBundle, IdentityProviderError> {
        let exchange_error = |reason: String| IdentityProviderError::TokenExchange { reason };

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("scope", scope),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.secret().as_str()),
            ])
            .send()
            .await
            .map_err(|e| exchange_error(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(exchange_error(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TokenBundle>()
            .await
            .map_err(|e| exchange_error(format!("malformed token response: {e}")))
    }

    async fn decode_access_token(
        &self,
        access_token: &str,
    ) -> Result<AccessClaims, IdentityProviderError> {
        let invalid = |reason: String| IdentityProviderError::TokenInvalid { reason };

        let header = jsonwebtoken::decode_header(access_token)
            .map_err(|e| invalid(format!("malformed token header: {e}")))?;
        if matches!(
            header.alg,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(invalid(format!(
                "symmetric algorithm {:?} not accepted",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| invalid("token header has no key ID".to_string()))?;

        let jwk = self.signing_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| invalid(format!("unusable signing key: {e}")))?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_aud = false;

        let data = jsonwebtoken::decode::<AccessTokenPayload>(access_token, &key, &validation)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(data.claims.into())
    }

    #[instrument(skip_all)]
    async fn revoke_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<(), IdentityProviderError> {
        let revocation_error = |reason: String| IdentityProviderError::Revocation { reason };

        let response = self
            .http_client
            .post(&self.logout_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.secret().as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| revocation_error(format!("logout endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(revocation_error(format!(
                "logout endpoint returned {status}"
            )));
        }

        Ok(())
    }
}

/// Fetches the provider's JSON Web Key Set.
async fn fetch_jwks(
    http_client: &reqwest::Client,
    jwks_url: &str,
) -> Result<JwkSet, IdentityProviderError> {
    let discovery_error = |reason: String| IdentityProviderError::Discovery { reason };

    http_client
        .get(jwks_url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| discovery_error(format!("failed to fetch JWKS: {e}")))?
        .json::<JwkSet>()
        .await
        .map_err(|e| discovery_error(format!("malformed JWKS: {e}")))
}

fn unknown_key(kid: &str) -> IdentityProviderError {
    IdentityProviderError::TokenInvalid {
        reason: format!("no signing key with ID '{kid}'"),
    }
}
