//! User and role repository.
//!
//! All mutating operations run inside a single transaction so the user row
//! and its role associations commit as one atomic unit; a partial write is
//! never observable. Role rows are created lazily the first time a role name
//! is referenced.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;

use crate::auth::models::{NewUser, StoredUser};
use crate::auth::roles::Role;
use crate::errors::{Error, Result};
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub identity: String,
    pub password_hash: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> (StoredUser, String) {
        let user = StoredUser {
            identity: self.identity,
            display_name: self.display_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (user, self.password_hash)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user with their initial role, atomically
    async fn create_user(&self, user: NewUser) -> Result<StoredUser>;

    /// Checked read used before insert; the constraint decides races
    async fn user_exists(&self, identity: &str) -> Result<bool>;

    /// Fetch a user with their password hash for authentication
    async fn get_user_with_password(&self, identity: &str)
        -> Result<Option<(StoredUser, String)>>;

    /// Current role set for an identity, loaded fresh
    async fn list_roles(&self, identity: &str) -> Result<Vec<Role>>;

    /// Attach a role to an identity; idempotent
    async fn add_role(&self, identity: &str, role: Role) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a SQLite constraint violation on insert to a typed conflict.
fn map_insert_error(err: sqlx::Error, identity: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            // 1555 = SQLITE_CONSTRAINT_PRIMARYKEY, 2067 = SQLITE_CONSTRAINT_UNIQUE
            if code.as_ref() == "1555"
                || code.as_ref() == "2067"
                || code.as_ref().starts_with("SQLITE_CONSTRAINT")
            {
                return Error::conflict(
                    format!("identity '{}' already registered", identity),
                    "user",
                );
            }
        }
    }
    Error::Database { source: err, context: "Failed to create user".to_string() }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(identity = %user.identity), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<StoredUser> {
        let now = Utc::now();
        let role_name = user.initial_role.to_string();

        let mut tx = self.pool.begin().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to begin transaction".to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO users (identity, password_hash, display_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.identity)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|err| map_insert_error(err, &user.identity))?;

        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT(name) DO NOTHING")
            .bind(&role_name)
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to create role".to_string(),
            })?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (identity, role_name)
            VALUES ($1, $2)
            ON CONFLICT(identity, role_name) DO NOTHING
            "#,
        )
        .bind(&user.identity)
        .bind(&role_name)
        .execute(&mut *tx)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to attach initial role".to_string(),
        })?;

        tx.commit().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to commit user creation".to_string(),
        })?;

        Ok(StoredUser {
            identity: user.identity,
            display_name: user.display_name,
            created_at: now,
            updated_at: now,
        })
    }

    #[instrument(skip(self), fields(identity = %identity), name = "db_user_exists")]
    async fn user_exists(&self, identity: &str) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM users WHERE identity = $1")
                .bind(identity)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| Error::Database {
                    source: err,
                    context: "Failed to check user existence".to_string(),
                })?;
        Ok(row.is_some())
    }

    #[instrument(skip(self), fields(identity = %identity), name = "db_get_user_with_password")]
    async fn get_user_with_password(
        &self,
        identity: &str,
    ) -> Result<Option<(StoredUser, String)>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT identity, password_hash, display_name, created_at, updated_at
            FROM users WHERE identity = $1
            "#,
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user".to_string(),
        })?;

        Ok(row.map(UserRow::into_user))
    }

    #[instrument(skip(self), fields(identity = %identity), name = "db_list_roles")]
    async fn list_roles(&self, identity: &str) -> Result<Vec<Role>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT role_name FROM user_roles WHERE identity = $1 ORDER BY role_name",
        )
        .bind(identity)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list roles".to_string(),
        })?;

        rows.into_iter()
            .map(|(name,)| {
                Role::from_str(&name).map_err(|_| {
                    Error::validation(format!("Unknown role '{}' in store", name))
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(identity = %identity, role = %role), name = "db_add_role")]
    async fn add_role(&self, identity: &str, role: Role) -> Result<()> {
        let role_name = role.to_string();

        let mut tx = self.pool.begin().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to begin transaction".to_string(),
        })?;

        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT(name) DO NOTHING")
            .bind(&role_name)
            .execute(&mut *tx)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to create role".to_string(),
            })?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (identity, role_name)
            VALUES ($1, $2)
            ON CONFLICT(identity, role_name) DO NOTHING
            "#,
        )
        .bind(identity)
        .bind(&role_name)
        .execute(&mut *tx)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to attach role".to_string(),
        })?;

        tx.commit().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to commit role grant".to_string(),
        })
    }
}
