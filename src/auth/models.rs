//! Data models for the Trayline credential subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::roles::Role;

/// Request-scoped result of authentication: who the caller is and which
/// roles they held when the token was issued.
///
/// Never persisted; reconstructed fresh per request from token claims, or
/// from the store during login/registration. Roles inside an issued token
/// are a snapshot; later role changes take effect only on the next token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identity: String,
    pub name: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(identity: String, name: String, mut roles: Vec<Role>) -> Self {
        roles.sort_unstable_by_key(|role| role.as_str());
        roles.dedup();
        Self { identity, name, roles }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Canonical uppercase role names, as they appear in token claims.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.to_string()).collect()
    }
}

/// Stored representation of a staff account, minus the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub identity: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New account payload handed to the repository.
///
/// Carries the already-computed hash; the repository never sees a plaintext
/// password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub identity: String,
    pub password_hash: String,
    pub display_name: String,
    pub initial_role: Role,
}
