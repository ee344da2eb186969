//! # Geo Module
//!
//! Geocoding and the radius search behind
//! `GET /bootcamps/radius/:zipcode/:distance`.

pub mod errors;
pub mod geocoder;
pub mod point;

pub use errors::{GeoError, GeoResult};
pub use geocoder::{Geocoder, TableGeocoder, ZipcodeEntry};
pub use point::{radius_radians, within_radius, GeoPoint, Location, EARTH_RADIUS_MILES};
