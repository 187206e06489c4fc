//! # Database Schema Management
//!
//! Embedded schema for the user/role store, applied at startup and in test
//! setup. Statements are idempotent so re-running on an existing database is
//! a no-op.
//!
//! Uniqueness of an identity and of a (identity, role) association is
//! enforced here, at the constraint level: two concurrent registrations of
//! the same identity cannot both succeed regardless of what the application
//! layer observed beforehand.

use tracing::info;

use crate::errors::{Error, Result};
use crate::storage::DbPool;

const SCHEMA: &[(&str, &str)] = &[
    (
        "001_create_users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            identity TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            display_name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "002_create_roles",
        r#"
        CREATE TABLE IF NOT EXISTS roles (
            name TEXT PRIMARY KEY
        )
        "#,
    ),
    (
        "003_create_user_roles",
        r#"
        CREATE TABLE IF NOT EXISTS user_roles (
            identity TEXT NOT NULL REFERENCES users(identity),
            role_name TEXT NOT NULL REFERENCES roles(name),
            PRIMARY KEY (identity, role_name)
        )
        "#,
    ),
];

/// Apply the embedded schema to the given pool.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    for (name, sql) in SCHEMA {
        sqlx::query(sql).execute(pool).await.map_err(|e| Error::Database {
            source: e,
            context: format!("Failed to apply migration '{}'", name),
        })?;
    }

    info!(statements = SCHEMA.len(), "database schema up to date");
    Ok(())
}
