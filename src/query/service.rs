//! Query service joining directory metadata with stored records

use super::cache::PayloadCache;
use super::{AirportResponse, QueryError};
use crate::directory::{normalize_code, AirportDirectory, AirportRef};
use crate::store::RecordStore;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Radius used by position searches that do not name one
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Answers airport lookups and searches
///
/// Matching runs against the in-memory directory; the stored record of each
/// match is fetched through a [`PayloadCache`].
pub struct QueryService {
    directory: Arc<AirportDirectory>,
    store: Arc<dyn RecordStore>,
    cache: PayloadCache,
    default_radius_km: f64,
}

impl QueryService {
    /// Creates a service whose cached records live for `ttl`
    pub fn new(directory: Arc<AirportDirectory>, store: Arc<dyn RecordStore>, ttl: Duration) -> Self {
        Self {
            directory,
            store,
            cache: PayloadCache::new(ttl),
            default_radius_km: DEFAULT_RADIUS_KM,
        }
    }

    pub fn with_default_radius(mut self, radius_km: f64) -> Self {
        self.default_radius_km = radius_km;
        self
    }

    pub fn default_radius_km(&self) -> f64 {
        self.default_radius_km
    }

    pub fn directory(&self) -> &AirportDirectory {
        &self.directory
    }

    pub fn cache(&self) -> &PayloadCache {
        &self.cache
    }

    /// Looks up one airport by IATA code
    ///
    /// An airport that is in the directory but was never crawled is not an
    /// error: the response has `count` 1 and a single `null` entry.
    ///
    /// # Returns
    ///
    /// * `Ok(AirportResponse)` - The airport's city and record (or `null`)
    /// * `Err(QueryError::InvalidCode)` - `code` is not three letters
    /// * `Err(QueryError::AirportNotFound)` - No such airport in the directory
    pub fn get_by_code(&self, code: &str) -> Result<AirportResponse, QueryError> {
        let code = normalize_code(code).ok_or_else(|| QueryError::InvalidCode(code.to_string()))?;
        let airport = self
            .directory
            .get(&code)
            .ok_or_else(|| QueryError::AirportNotFound(code.clone()))?;

        let payload = self.cache.get(&airport.code, self.store.as_ref());
        if payload.is_none() {
            tracing::debug!("No record available for airport {}", airport.code);
        }

        Ok(AirportResponse {
            cities: vec![airport.city.clone()],
            count: 1,
            airports: vec![payload.unwrap_or(Value::Null)],
        })
    }

    /// Airports whose name contains `name`, ignoring case
    pub fn search_by_name(&self, name: &str) -> AirportResponse {
        self.respond(self.directory.search_name(name))
    }

    /// Airports whose country code equals `country_code`, ignoring case
    pub fn search_by_country(&self, country_code: &str) -> AirportResponse {
        self.respond(self.directory.search_country(country_code))
    }

    /// Airports within `radius_km` of (`lat`, `lon`), boundary inclusive
    ///
    /// `None` uses the service's default radius. Coordinates are expected to
    /// be validated by the caller.
    pub fn search_by_position(&self, lat: f64, lon: f64, radius_km: Option<f64>) -> AirportResponse {
        let radius_km = radius_km.unwrap_or(self.default_radius_km);
        tracing::debug!("Position search at ({}, {}) within {} km", lat, lon, radius_km);
        self.respond(self.directory.nearby(lat, lon, radius_km))
    }

    /// Builds a search response; matches without a usable record are left out
    fn respond(&self, matches: Vec<&AirportRef>) -> AirportResponse {
        let mut cities: Vec<String> = Vec::new();
        for airport in &matches {
            if !cities.contains(&airport.city) {
                cities.push(airport.city.clone());
            }
        }

        let airports: Vec<Value> = matches
            .iter()
            .filter_map(|airport| self.cache.get(&airport.code, self.store.as_ref()))
            .collect();

        AirportResponse {
            cities,
            count: airports.len(),
            airports,
        }
    }
}
