/// Database connection management and schema creation
pub mod database;

/// Application settings loading from homeroom.toml and the environment
pub mod settings;
