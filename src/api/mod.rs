//! # REST API Layer
//!
//! Axum HTTP surface for the auth subsystem: route assembly, handlers, the
//! error boundary, and the server loop.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use routes::{build_router, ApiState};
pub use server::start_api_server;
