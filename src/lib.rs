pub mod commands;
pub mod config;
pub mod error;
pub mod revision;
pub mod store;
pub mod utils;
