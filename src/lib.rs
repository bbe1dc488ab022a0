//! M3U playlist parsing and concurrent stream availability probing

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod sources;
pub mod utils;
