//! Per-request authorization decisions.
//!
//! The engine moves a request through
//! `Unauthenticated -> Authenticated -> {Authorized, Forbidden}`:
//!
//! 1. No access token: `LoginRequired(NoSession)`.
//! 2. Token rejected by the provider: `LoginRequired(InvalidToken)`.
//! 3. Roles disjoint from the allow-list: `Forbidden`, otherwise `Authorized`.
//!
//! Expired tokens are not refreshed; the user logs in again.

use crate::claims::AccessClaims;
use crate::provider::IdentityProvider;
use crate::role::RoleSet;
use std::sync::Arc;
use tracing::debug;

/// Why a request has to go through login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginReason {
    /// No (readable) access token cookie.
    NoSession,
    /// The provider rejected the access token.
    InvalidToken,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// Valid session whose roles meet the allow-list.
    Authorized(AccessClaims),
    /// No valid session.
    LoginRequired(LoginReason),
    /// Valid session lacking every allowed role.
    Forbidden(AccessClaims),
}

impl AuthDecision {
    /// Returns true for `Authorized`.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }
}

/// Stateless authorization engine.
#[derive(Clone)]
pub struct AuthorizationEngine {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthorizationEngine {
    /// Creates an engine validating tokens with the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Decides whether the holder of `access_token` may reach a resource
    /// guarded by `allow`.
    ///
    /// Never fails: every error resolves to a denial.
    pub async fn authorize(&self, access_token: Option<&str>, allow: &RoleSet) -> AuthDecision {
        let Some(token) = access_token else {
            return AuthDecision::LoginRequired(LoginReason::NoSession);
        };

        let claims = match self.provider.decode_access_token(token).await {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "access token rejected");
                return AuthDecision::LoginRequired(LoginReason::InvalidToken);
            }
        };

        if claims.roles.intersects(allow) {
            AuthDecision::Authorized(claims)
        } else {
            debug!(username = %claims.username, "no allowed role");
            AuthDecision::Forbidden(claims)
        }
    }
}
