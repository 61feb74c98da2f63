//! Claims decoded from an access token.
//!
//! Claims are derived, never stored: they are recomputed from the access
//! token on every request that needs an authorization decision.

use crate::role::RoleSet;
use serde::Deserialize;

/// Identity and roles asserted by a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// Realm roles recognized by this gate.
    pub roles: RoleSet,
    /// Display name (`name` claim).
    pub name: String,
    /// Login name (`preferred_username` claim).
    pub username: String,
}

impl AccessClaims {
    /// Creates claims from already-resolved parts.
    #[must_use]
    pub fn new(roles: RoleSet, name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            roles,
            name: name.into(),
            username: username.into(),
        }
    }
}

/// The subset of a Keycloak-style access token payload this gate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessTokenPayload {
    #[serde(default)]
    realm_access: RealmAccess,
    #[serde(default)]
    name: String,
    #[serde(default)]
    preferred_username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RealmAccess {
    #[serde(default)]
    roles: Vec<String>,
}

impl From<AccessTokenPayload> for AccessClaims {
    fn from(payload: AccessTokenPayload) -> Self {
        Self {
            roles: RoleSet::from_claim_values(&payload.realm_access.roles),
            name: payload.name,
            username: payload.preferred_username,
        }
    }
}
