//! Protected pages.

use axum::Json;
use serde_json::{Value, json};

use crate::auth::{RequireAdmin, RequireUser};

/// Home page, open to every signed-in user. Lists the available endpoints.
pub async fn home(RequireUser(claims): RequireUser) -> Json<Value> {
    tracing::debug!(username = %claims.username, "home page");
    Json(json!({
        "/": "homepage, allow all user to access after login",
        "/login": "redirect user to the identity provider, for login",
        "/logout": "revoke auth token from the identity provider, redirect user to /",
        "/admin": "admin page, only allow user with admin role to access",
    }))
}

/// Admin page.
pub async fn admin(RequireAdmin(claims): RequireAdmin) -> String {
    tracing::debug!(username = %claims.username, "admin page");
    "admin page, only allow user with admin role to access".to_string()
}

/// Liveness probe, no session required.
pub async fn healthz() -> &'static str {
    "ok"
}
