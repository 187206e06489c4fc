//! Role vocabulary and per-route allow-lists.
//!
//! Roles are a closed set of canonical uppercase identifiers. They are value
//! objects: two roles are interchangeable exactly when their names match, and
//! parsing is case-insensitive with the canonical form used for storage,
//! token claims, and comparison.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Staff role in the meal-ordering platform.
///
/// `Public` is the distinguished marker meaning "no authentication required";
/// it appears in route allow-lists, never as a role a principal holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Public,
    Guest,
    Nurse,
    Chef,
    HeadChef,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Public => "PUBLIC",
            Role::Guest => "GUEST",
            Role::Nurse => "NURSE",
            Role::Chef => "CHEF",
            Role::HeadChef => "HEAD_CHEF",
            Role::Admin => "ADMIN",
        }
    }

    /// Every role a principal can actually hold (excludes the public marker).
    pub fn assignable() -> [Role; 5] {
        [Role::Guest, Role::Nurse, Role::Chef, Role::HeadChef, Role::Admin]
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PUBLIC" => Ok(Role::Public),
            "GUEST" => Ok(Role::Guest),
            "NURSE" => Ok(Role::Nurse),
            "CHEF" => Ok(Role::Chef),
            "HEAD_CHEF" => Ok(Role::HeadChef),
            "ADMIN" => Ok(Role::Admin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Error returned when a role string is outside the closed vocabulary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The set of roles a route declares as sufficient for access.
///
/// An empty set or one containing [`Role::Public`] marks the route public.
#[derive(Debug, Clone, Default)]
pub struct RoleSet {
    roles: HashSet<Role>,
}

impl RoleSet {
    /// Allow-list for a route that requires no authentication.
    pub fn public() -> Self {
        Self::default()
    }

    /// Allow-list built from an explicit set of roles.
    pub fn of(roles: &[Role]) -> Self {
        Self { roles: roles.iter().copied().collect() }
    }

    /// Allow-list admitting any authenticated staff role.
    pub fn authenticated() -> Self {
        Self::of(&Role::assignable())
    }

    /// True iff the allow-list is empty or carries the public marker.
    pub fn is_public(&self) -> bool {
        self.roles.is_empty() || self.roles.contains(&Role::Public)
    }

    /// Non-empty intersection check against the roles a principal holds.
    ///
    /// Case sensitivity is a non-issue here: both sides are canonical
    /// [`Role`] values by the time they meet.
    pub fn allows(&self, held: &[Role]) -> bool {
        held.iter().any(|role| self.roles.contains(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    /// Space-separated canonical names, for log spans.
    pub fn summary(&self) -> String {
        let mut names: Vec<&str> = self.roles.iter().map(|role| role.as_str()).collect();
        names.sort_unstable();
        names.join(" ")
    }
}
