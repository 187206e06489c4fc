pub mod auth;
pub mod health;

pub use auth::{add_role_handler, login_handler, register_handler};
pub use health::health_handler;
