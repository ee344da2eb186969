//! # Geocoder
//!
//! Address to [`Location`] resolution. The built-in implementation
//! looks the address's zipcode up in a configured table.

use std::collections::HashMap;
use std::future::Future;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{GeoError, GeoResult};
use super::point::Location;

static ZIPCODE: OnceLock<Regex> = OnceLock::new();

fn zipcode_pattern() -> &'static Regex {
    ZIPCODE.get_or_init(|| Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("valid zipcode regex"))
}

/// Resolves free-form addresses
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> impl Future<Output = GeoResult<Location>> + Send;
}

/// One row of the zipcode table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipcodeEntry {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "US".to_string()
}

/// Table-backed geocoder
#[derive(Debug, Clone, Default)]
pub struct TableGeocoder {
    table: HashMap<String, ZipcodeEntry>,
}

impl TableGeocoder {
    pub fn new(table: HashMap<String, ZipcodeEntry>) -> Self {
        Self { table }
    }

    /// First 5-digit zipcode in `address`
    pub fn extract_zipcode(address: &str) -> Option<&str> {
        zipcode_pattern()
            .captures(address)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn lookup(&self, address: &str) -> GeoResult<Location> {
        let zipcode = Self::extract_zipcode(address)
            .ok_or_else(|| GeoError::NoZipcode(address.to_string()))?;
        let entry = self
            .table
            .get(zipcode)
            .ok_or_else(|| GeoError::UnknownZipcode(zipcode.to_string()))?;

        debug!(zipcode, city = %entry.city, "geocoded address");

        Ok(Location {
            kind: "Point".to_string(),
            coordinates: [entry.longitude, entry.latitude],
            formatted_address: format!(
                "{}, {} {} {}",
                entry.city, entry.state, zipcode, entry.country
            ),
            city: entry.city.clone(),
            state: entry.state.clone(),
            zipcode: zipcode.to_string(),
            country: entry.country.clone(),
        })
    }
}

impl Geocoder for TableGeocoder {
    async fn geocode(&self, address: &str) -> GeoResult<Location> {
        self.lookup(address)
    }
}
