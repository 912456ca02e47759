//! Query module for serving stored records
//!
//! This module contains:
//! - A time-expiring cache of parsed records
//! - The query service: lookup by code, name, country, and radius

mod cache;
mod service;

pub use cache::{CacheEntry, PayloadCache};
pub use service::{QueryService, DEFAULT_RADIUS_KM};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by query operations
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Airport not found: {0}")]
    AirportNotFound(String),

    #[error("Invalid airport code: {0:?}")]
    InvalidCode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every query answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportResponse {
    /// Distinct cities of the matched airports, first-seen order
    pub cities: Vec<String>,

    /// Number of entries in `airports`
    pub count: usize,

    /// Stored records of the matched airports
    pub airports: Vec<Value>,
}
