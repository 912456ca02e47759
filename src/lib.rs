//! Lounge-Atlas: an airport lounge crawler and query service
//!
//! This crate acquires per-airport and per-lounge records from a remote API in
//! two dependent, resumable crawl stages, persists each record as its own JSON
//! file, and answers lookups by code, name, country, and geographic radius.

pub mod config;
pub mod crawler;
pub mod directory;
pub mod geo;
pub mod query;
pub mod server;
pub mod store;

use thiserror::Error;

/// Main error type for Lounge-Atlas operations
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Directory error: {0}")]
    Directory(#[from] directory::DirectoryError),

    #[error("Query error: {0}")]
    Query(#[from] query::QueryError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lounge-Atlas operations
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, StageReport};
pub use directory::{AirportDirectory, AirportRef};
pub use query::{AirportResponse, QueryService};
pub use store::{FsStore, MemoryStore, RecordStore};
