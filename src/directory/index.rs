//! Airport directory index with constant-time IATA code lookup

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use super::{normalize_code, AirportRef};
use crate::geo::within_radius;

/// Table compiled into the binary, used unless a config overrides it
const BUNDLED_AIRPORTS: &str = include_str!("../../data/airports.json");

/// Error type for airport directory operations
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Airport table not found at: {0}")]
    NotFound(PathBuf),
    #[error("Failed to parse airport table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid IATA code in airport table: {0:?}")]
    InvalidCode(String),
    #[error("Duplicate IATA code in airport table: {0}")]
    DuplicateCode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Index of airports by IATA code
///
/// Entries keep the order of the source table; searches return matches in
/// that order.
#[derive(Debug, Default)]
pub struct AirportDirectory {
    airports: Vec<AirportRef>,
    by_code: HashMap<String, usize>,
}

impl AirportDirectory {
    /// Builds a directory from the bundled airport table
    pub fn bundled() -> Result<Self, DirectoryError> {
        Self::from_json_str(BUNDLED_AIRPORTS)
    }

    /// Builds a directory from the configured table, falling back to the bundled one
    pub fn load(path: Option<&Path>) -> Result<Self, DirectoryError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Builds a directory from a JSON airport table on disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DirectoryError::NotFound(path.to_path_buf()));
        }

        tracing::debug!("Loading airport table from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let airports: Vec<AirportRef> = serde_json::from_reader(reader)?;
        Self::from_entries(airports)
    }

    /// Builds a directory from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let airports: Vec<AirportRef> = serde_json::from_str(json)?;
        Self::from_entries(airports)
    }

    /// Builds a directory from parsed entries
    ///
    /// Codes are normalized to upper case; malformed or duplicate codes are
    /// rejected.
    pub fn from_entries(entries: Vec<AirportRef>) -> Result<Self, DirectoryError> {
        let mut directory = Self::default();

        for mut airport in entries {
            let code = normalize_code(&airport.code)
                .ok_or_else(|| DirectoryError::InvalidCode(airport.code.clone()))?;
            if directory.by_code.contains_key(&code) {
                return Err(DirectoryError::DuplicateCode(code));
            }
            airport.code = code.clone();
            directory.by_code.insert(code, directory.airports.len());
            directory.airports.push(airport);
        }

        tracing::info!("Built airport directory with {} entries", directory.len());

        Ok(directory)
    }

    /// Looks up an airport by IATA code, ignoring case
    pub fn get(&self, code: &str) -> Option<&AirportRef> {
        let code = normalize_code(code)?;
        self.by_code.get(&code).map(|&i| &self.airports[i])
    }

    /// Airports whose name contains `needle`, ignoring case
    pub fn search_name(&self, needle: &str) -> Vec<&AirportRef> {
        let needle = needle.to_lowercase();
        self.airports
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Airports in the given country, matched case-insensitively
    pub fn search_country(&self, country_code: &str) -> Vec<&AirportRef> {
        let country_code = country_code.trim();
        self.airports
            .iter()
            .filter(|a| a.country_code.eq_ignore_ascii_case(country_code))
            .collect()
    }

    /// Airports within `radius_km` of (`lat`, `lon`), boundary inclusive
    pub fn nearby(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<&AirportRef> {
        self.airports
            .iter()
            .filter(|a| within_radius((lat, lon), a.position(), radius_km))
            .collect()
    }

    /// Iterates over all airports in table order
    pub fn iter(&self) -> impl Iterator<Item = &AirportRef> {
        self.airports.iter()
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}
