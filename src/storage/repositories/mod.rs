//! Repository traits and SQLx implementations for the user/role store.

mod user;

pub use user::{SqlxUserRepository, UserRepository};
