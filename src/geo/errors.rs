//! # Geo Errors

use thiserror::Error;

/// Result type for geo operations
pub type GeoResult<T> = Result<T, GeoError>;

/// Geocoding and radius-search errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Address carries no 5-digit zipcode
    #[error("No zipcode found in address '{0}'")]
    NoZipcode(String),

    /// Zipcode is not in the geocoder's table
    #[error("Could not geocode zipcode {0}")]
    UnknownZipcode(String),

    /// Radius distance is not a positive finite number
    #[error("Invalid distance '{0}'")]
    InvalidDistance(String),
}

impl GeoError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        400
    }
}
