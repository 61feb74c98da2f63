//! Role and allow-list types for access control.
//!
//! Roles come from the identity provider's realm roles. Membership, not
//! hierarchy, decides access: an `Admin` is only allowed where `Admin` is
//! listed, and gets `User` access only if the provider also grants `User`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Access role granted by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Standard user.
    User,
    /// Administrator.
    Admin,
}

impl Role {
    /// Returns the wire name of the role as it appears in token claims.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Unordered set of roles.
///
/// Used both for the roles a token carries and for the allow-list a
/// protected resource declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: BTreeSet<Role>,
}

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a role set from any collection of roles.
    #[must_use]
    pub fn of(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    /// Builds a role set from raw claim strings, skipping names outside the
    /// known role set (providers add their own default roles).
    #[must_use]
    pub fn from_claim_values<S: AsRef<str>>(values: &[S]) -> Self {
        Self {
            roles: values
                .iter()
                .filter_map(|v| v.as_ref().parse().ok())
                .collect(),
        }
    }

    /// Returns true if the set contains the given role.
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true if the two sets share at least one role.
    #[must_use]
    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.roles.intersection(&other.roles).next().is_some()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterates over the roles in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self::of(iter)
    }
}
