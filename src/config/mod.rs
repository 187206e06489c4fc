//! # Configuration Management
//!
//! Configuration structures for the Trayline auth service. All values are
//! resolved from environment variables at process start; nothing here is
//! re-read or mutated afterwards.

mod settings;

pub use settings::{ApiServerConfig, AuthConfig, DatabaseConfig};
