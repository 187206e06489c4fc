//! # Authentication & Authorization
//!
//! The credential/token subsystem: role vocabulary, password hashing,
//! bearer-token issuance and verification, the credential store, and the
//! per-route authorization middleware.

pub mod credential_store;
pub mod hashing;
pub mod middleware;
pub mod models;
pub mod roles;
pub mod token_service;

pub use credential_store::CredentialStore;
pub use models::Principal;
pub use roles::{Role, RoleSet};
pub use token_service::{SigningConfig, TokenService};
