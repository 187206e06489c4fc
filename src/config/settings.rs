//! # Configuration Settings
//!
//! Defines the configuration structures for the Trayline auth service and
//! their `from_env` constructors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Default token time-to-live when `JWT_EXPIRE_TIME` is unset: one hour.
const DEFAULT_TOKEN_TTL_MS: u64 = 3_600_000;

/// Signing configuration consumed by the token service.
///
/// Constructed once at startup and never mutated; a missing or weak secret is
/// fatal here rather than surfacing per-request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret used to sign and verify tokens
    pub jwt_secret: String,

    /// Issuer claim stamped into every token and required on verification
    pub jwt_issuer: String,

    /// Token time-to-live in milliseconds
    pub jwt_expire_ms: u64,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// `JWT_SECRET_KEY` is required; `JWT_ISSUER` and `JWT_EXPIRE_TIME`
    /// (milliseconds) fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET_KEY")
            .map_err(|_| Error::config("JWT_SECRET_KEY must be set"))?;
        let jwt_issuer =
            std::env::var("JWT_ISSUER").unwrap_or_else(|_| "trayline".to_string());
        let jwt_expire_ms = match std::env::var("JWT_EXPIRE_TIME") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| Error::config("JWT_EXPIRE_TIME must be a millisecond count"))?,
            Err(_) => DEFAULT_TOKEN_TTL_MS,
        };

        let config = Self { jwt_secret, jwt_issuer, jwt_expire_ms };
        config.validate()?;
        Ok(config)
    }

    /// Validate the auth configuration
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < 32 {
            return Err(Error::config("JWT secret must be at least 32 characters long"));
        }
        if self.jwt_issuer.is_empty() {
            return Err(Error::config("JWT issuer cannot be empty"));
        }
        if self.jwt_expire_ms == 0 {
            return Err(Error::config("JWT expire time must be greater than 0"));
        }
        Ok(())
    }

    /// Token time-to-live as a [`Duration`]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_millis(self.jwt_expire_ms)
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Minimum number of pooled connections
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connect_timeout_seconds: u64,

    /// Run embedded migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://trayline.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_seconds: 5,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables, falling back
    /// to a local SQLite file.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: env_parse("DATABASE_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_seconds: env_parse(
                "DATABASE_CONNECT_TIMEOUT",
                defaults.connect_timeout_seconds,
            ),
            auto_migrate: env_parse("DATABASE_AUTO_MIGRATE", defaults.auto_migrate),
        }
    }

    /// Validate the database configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::validation("database URL cannot be empty"));
        }
        if !self.is_sqlite() {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }
        if self.max_connections == 0 {
            return Err(Error::validation("max_connections must be greater than 0"));
        }
        if self.min_connections > self.max_connections {
            return Err(Error::validation(
                "min_connections cannot be greater than max_connections",
            ));
        }
        Ok(())
    }

    /// Whether the URL points at a SQLite database
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    /// Connection acquire timeout as a [`Duration`]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// HTTP API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiServerConfig {
    /// Server bind address
    pub bind_address: String,

    /// Server port
    pub port: u16,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080 }
    }
}

impl ApiServerConfig {
    /// Load API server configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("TRAYLINE_API_HOST").unwrap_or(defaults.bind_address),
            port: env_parse("TRAYLINE_API_PORT", defaults.port),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok()).unwrap_or(default)
}
