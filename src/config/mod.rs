/// Database configuration and connection management
pub mod database;

/// Application settings loading from paidly.toml
pub mod settings;
