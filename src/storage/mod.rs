//! # Storage Layer
//!
//! SQLx-backed persistence for the user/role store.

mod migrations;
mod pool;
pub mod repositories;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};
