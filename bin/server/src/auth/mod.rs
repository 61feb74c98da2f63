//! Authentication module for the session-gate server.
//!
//! This module provides:
//! - OIDC authentication with an external identity provider
//! - Encrypted cookie sessions (no server-side session store)
//! - Authorization extractors for Axum routes
//!
//! # Authorization Model
//!
//! Every request to a protected route re-validates the access token held in
//! the session cookie and intersects its realm roles with the route's
//! allow-list:
//! - No session, or a token the provider rejects: redirect to `/login`
//! - Valid token without an allowed role: `403 Forbidden`
//!
//! Tokens are never refreshed silently. Once the access token expires the
//! user logs in again.

pub mod middleware;
pub mod oidc;
pub mod routes;
pub mod session;

use session_gate_access::{AuthorizationEngine, IdentityProvider};
use std::sync::Arc;

pub use middleware::{RequireAdmin, RequireUser};
pub use oidc::OidcClient;
pub use routes::{callback, login, logout};
pub use session::SessionManager;

/// Settings the login flow needs beyond the provider itself.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Space-separated scopes requested at login.
    pub scope: String,
    /// Externally visible base URL; derived from the request when `None`.
    pub public_url: Option<String>,
}

/// Shared application state.
pub struct AppState {
    /// Identity provider client.
    pub provider: Arc<dyn IdentityProvider>,
    /// Per-request authorization decisions.
    pub engine: AuthorizationEngine,
    /// Session cookie handling.
    pub sessions: SessionManager,
    /// Login flow settings.
    pub flow: FlowConfig,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        sessions: SessionManager,
        flow: FlowConfig,
    ) -> Self {
        Self {
            engine: AuthorizationEngine::new(provider.clone()),
            provider,
            sessions,
            flow,
        }
    }
}
