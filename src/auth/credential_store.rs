//! Credential verification and account management on top of the user store.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::hashing;
use crate::auth::models::{NewUser, Principal};
use crate::auth::roles::Role;
use crate::errors::{AuthErrorType, Error, Result};
use crate::storage::repositories::{SqlxUserRepository, UserRepository};
use crate::storage::DbPool;

/// Pre-computed dummy hash for timing-safe identity enumeration prevention.
/// When an unknown identity is used, we still run Argon2 verification against
/// this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Looks up identities, verifies passwords, creates accounts, and attaches
/// roles. Owns no mutable state beyond a handle to the store; role sets are
/// loaded fresh on every call, never cached.
#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<dyn UserRepository>,
}

impl CredentialStore {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub fn with_sqlx(pool: DbPool) -> Self {
        Self::new(Arc::new(SqlxUserRepository::new(pool)))
    }

    /// Normalize an identity for storage and lookup. Identities are emails or
    /// usernames; both compare case-insensitively.
    pub fn normalize_identity(identity: &str) -> String {
        identity.trim().to_lowercase()
    }

    /// Verify an identity/password pair and return the authenticated
    /// principal with its current role set.
    ///
    /// Unknown identity and wrong password stay distinct here (and in the
    /// logs); the login boundary collapses them into one client-visible 401.
    #[instrument(skip(self, password), fields(identity = %identity))]
    pub async fn verify(&self, identity: &str, password: &str) -> Result<Principal> {
        let identity = Self::normalize_identity(identity);

        let (user, password_hash) = match self
            .repository
            .get_user_with_password(&identity)
            .await?
        {
            Some(found) => found,
            None => {
                // Burn the same Argon2 work as the real path so response time
                // does not reveal whether the identity exists.
                if let Err(e) = hashing::verify_password(password, &DUMMY_HASH) {
                    warn!(error = %e, "dummy hash verification failed unexpectedly");
                }
                warn!(identity = %identity, "login attempt for unknown identity");
                return Err(Error::not_found("user", identity));
            }
        };

        if !hashing::verify_password(password, &password_hash)? {
            warn!(identity = %identity, "login attempt with incorrect password");
            return Err(Error::auth(
                "invalid identity or password",
                AuthErrorType::InvalidCredentials,
            ));
        }

        let roles = self.repository.list_roles(&identity).await?;
        info!(identity = %identity, "credentials verified");
        Ok(Principal::new(user.identity, user.display_name, roles))
    }

    /// Create a new account with one initial role and return its principal.
    ///
    /// The checked read gives a clean conflict message on the common path;
    /// the store's primary-key constraint is what actually decides a
    /// concurrent race, so the loser still gets a conflict at insert time.
    #[instrument(skip(self, password), fields(identity = %identity, role = %initial_role))]
    pub async fn create(
        &self,
        identity: &str,
        password: &str,
        display_name: Option<&str>,
        initial_role: Role,
    ) -> Result<Principal> {
        let identity = Self::normalize_identity(identity);
        if identity.is_empty() {
            return Err(Error::validation("identity cannot be empty"));
        }

        if self.repository.user_exists(&identity).await? {
            warn!(identity = %identity, "registration attempt for existing identity");
            return Err(Error::conflict(
                format!("identity '{}' already registered", identity),
                "user",
            ));
        }

        let password_hash = hashing::hash_password(password)?;
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&identity)
            .to_string();

        let user = self
            .repository
            .create_user(NewUser {
                identity: identity.clone(),
                password_hash,
                display_name,
                initial_role,
            })
            .await?;

        info!(identity = %identity, role = %initial_role, "staff account created");
        Ok(Principal::new(user.identity, user.display_name, vec![initial_role]))
    }

    /// Attach a role to an existing account. Idempotent: granting a role the
    /// account already holds is a no-op success.
    #[instrument(skip(self), fields(identity = %identity, role = %role))]
    pub async fn add_role(&self, identity: &str, role: Role) -> Result<Principal> {
        let identity = Self::normalize_identity(identity);

        let (user, _) = self
            .repository
            .get_user_with_password(&identity)
            .await?
            .ok_or_else(|| Error::not_found("user", identity.clone()))?;

        self.repository.add_role(&identity, role).await?;
        let roles = self.repository.list_roles(&identity).await?;

        info!(identity = %identity, role = %role, "role granted");
        Ok(Principal::new(user.identity, user.display_name, roles))
    }
}
