pub mod cleanup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod detection;
pub mod identity;
pub mod models;
pub mod platform;
pub mod utils;

pub use cli::run;
