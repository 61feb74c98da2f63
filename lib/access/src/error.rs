//! Error types for the access crate.
//!
//! Plain error values; the server wraps them in a `rootcause::Report` where
//! it needs context (`OidcClient::discover`).
//!
//! - `IdentityProviderError`: failures talking to, or trusting, the provider
//! - `KeyError`, `EncryptionError`, `DecryptionError`: cookie codec failures

use std::fmt;

/// Errors from identity provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityProviderError {
    /// Invalid URLs or client settings.
    Configuration { reason: String },
    /// Provider metadata or signing keys could not be fetched.
    Discovery { reason: String },
    /// The provider rejected the authorization code or could not be reached.
    TokenExchange { reason: String },
    /// The access token is expired, badly signed, or unparseable.
    TokenInvalid { reason: String },
    /// The provider did not accept the refresh token revocation.
    Revocation { reason: String },
}

impl fmt::Display for IdentityProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "identity provider configuration error: {reason}")
            }
            Self::Discovery { reason } => {
                write!(f, "identity provider discovery failed: {reason}")
            }
            Self::TokenExchange { reason } => {
                write!(f, "token exchange failed: {reason}")
            }
            Self::TokenInvalid { reason } => {
                write!(f, "invalid access token: {reason}")
            }
            Self::Revocation { reason } => {
                write!(f, "refresh token revocation failed: {reason}")
            }
        }
    }
}

impl std::error::Error for IdentityProviderError {}

/// The configured cookie encryption key is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key is not URL-safe base64.
    InvalidEncoding,
    /// The key does not decode to 32 bytes.
    InvalidLength { len: usize },
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding => write!(f, "encryption key is not URL-safe base64"),
            Self::InvalidLength { len } => {
                write!(f, "encryption key must be 32 bytes, got {len}")
            }
        }
    }
}

impl std::error::Error for KeyError {}

/// A cookie payload could not be sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionError;

impl fmt::Display for EncryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cookie encryption failed")
    }
}

impl std::error::Error for EncryptionError {}

/// A cookie value is malformed or was tampered with.
///
/// Carries no detail so that nothing about the failure can leak to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptionError;

impl fmt::Display for DecryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cookie decryption failed")
    }
}

impl std::error::Error for DecryptionError {}
