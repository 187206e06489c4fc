//! # Observability Infrastructure
//!
//! Structured logging for the Trayline auth service via the tracing
//! ecosystem.

mod logging;

pub use logging::init_tracing;
