pub mod config;
pub mod constants;
pub mod env_guard;
