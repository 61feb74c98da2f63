//! Tokens issued by the identity provider on a successful code exchange.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Response body of the provider's token endpoint.
///
/// Produced once per login and never modified. A response missing any of
/// these fields is treated as malformed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// How the token can be used, normally `Bearer`.
    pub token_type: String,
    /// The access token.
    pub access_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    /// The refresh token.
    pub refresh_token: String,
    /// Lifetime of the refresh token in seconds.
    pub refresh_expires_in: u64,
    /// The ID token.
    pub id_token: String,
}

// Tokens must never end up in logs.
impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBundle")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &"<redacted>")
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("id_token", &"<redacted>")
            .finish()
    }
}
