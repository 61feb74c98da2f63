//! Session cookies and role-based access decisions for session-gate.
//!
//! This crate provides:
//! - Symmetric encryption of cookie payloads (`CookieCodec`)
//! - Role-based access control (`Role`, `RoleSet`)
//! - Token and claim types (`TokenBundle`, `AccessClaims`)
//! - The identity provider interface (`IdentityProvider`, `OidcConfig`)
//! - The per-request decision engine (`AuthorizationEngine`)
//!
//! # Access Control Model
//!
//! A protected resource declares an allow-list of roles. A request is
//! authorized iff the roles in its access token intersect that allow-list.
//! There is no role hierarchy.
//!
//! # Example
//!
//! ```
//! use session_gate_access::{CookieCodec, Role, RoleSet};
//!
//! let codec = CookieCodec::new([42u8; 32]);
//! let sealed = codec.encrypt("access-token").unwrap();
//! assert_eq!(codec.decrypt(Some(&sealed)).unwrap().as_deref(), Some("access-token"));
//! assert_eq!(codec.decrypt(None).unwrap(), None);
//!
//! let admin_page = RoleSet::of([Role::Admin]);
//! assert!(!RoleSet::of([Role::User]).intersects(&admin_page));
//! ```

pub mod claims;
pub mod codec;
pub mod engine;
pub mod error;
pub mod oidc;
pub mod provider;
pub mod role;
pub mod token;

// Re-export main types at crate root
pub use claims::{AccessClaims, AccessTokenPayload};
pub use codec::CookieCodec;
pub use engine::{AuthDecision, AuthorizationEngine, LoginReason};
pub use error::{DecryptionError, EncryptionError, IdentityProviderError, KeyError};
pub use oidc::OidcConfig;
pub use provider::IdentityProvider;
pub use role::{Role, RoleSet, UnknownRole};
pub use token::TokenBundle;
