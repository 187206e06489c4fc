//! # Structured Logging
//!
//! Initializes the tracing subscriber for the process. Log verbosity is
//! controlled through `RUST_LOG`; the default keeps the auth subsystem at
//! `info` so credential failures and role denials are visible without
//! drowning request noise.
//!
//! Nothing in this crate ever logs a plaintext password or a full bearer
//! token; spans carry identities and correlation ids only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// Safe to call exactly once per process; a second call returns an error
/// instead of panicking so tests can tolerate shared process state.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize tracing: {}", e)))
}
