//! # Trayline
//!
//! Trayline is the staff-facing authentication and authorization service for a
//! hospital meal-ordering platform. Ward staff, kitchen staff, and
//! administrators authenticate with an identity and password, receive a signed
//! bearer token, and are authorized per request against the role allow-list
//! each route declares.
//!
//! ## Architecture
//!
//! The system follows a layered architecture pattern:
//!
//! ```text
//! REST API Layer → Authorization Middleware → Handlers
//!      ↓                    ↓                    ↓
//! Token Service      Credential Store     Persistence Layer
//! ```
//!
//! ## Core Components
//!
//! - **REST API Gateway**: Axum-based HTTP server exposing login, registration
//!   and role management
//! - **Token Service**: HS256 JWT issuance and verification against an
//!   immutable signing configuration
//! - **Credential Store**: Argon2id password verification and account creation
//!   on top of the user/role repository
//! - **Persistence Layer**: SQLx with SQLite for the user and role store

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used types and traits
pub use config::{ApiServerConfig, AuthConfig, DatabaseConfig};
pub use errors::{Error, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
