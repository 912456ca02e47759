//! Airport directory
//!
//! The directory is the static reference table of known airports. It seeds the
//! first crawl stage and supplies the metadata every query is resolved against.

mod index;

pub use index::{AirportDirectory, DirectoryError};

use serde::Deserialize;

/// One airport in the reference table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AirportRef {
    /// IATA code, three upper-case ASCII letters
    #[serde(rename = "iata")]
    pub code: String,

    pub name: String,

    /// ISO 3166-1 alpha-2 country code
    #[serde(rename = "country")]
    pub country_code: String,

    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AirportRef {
    /// Position as (latitude, longitude) in degrees
    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Normalizes user input into an IATA code
///
/// Trims surrounding whitespace and upper-cases the code.
///
/// # Returns
///
/// * `Some(String)` - Three ASCII letters, upper-cased
/// * `None` - Input is not an IATA-shaped code
///
/// # Example
///
/// ```
/// use lounge_atlas::directory::normalize_code;
///
/// assert_eq!(normalize_code(" jfk ").as_deref(), Some("JFK"));
/// assert_eq!(normalize_code("JFKX"), None);
/// ```
pub fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}
