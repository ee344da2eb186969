//! # Points and Radius Math
//!
//! Coordinates are stored GeoJSON style: `[longitude, latitude]`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{GeoError, GeoResult};

/// Earth radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3963.2;

/// A position on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Read `location.coordinates` from a stored record
    pub fn from_record(record: &Value) -> Option<Self> {
        let coords = record.get("location")?.get("coordinates")?.as_array()?;
        match coords.as_slice() {
            [lng, lat] => Some(Self::new(lng.as_f64()?, lat.as_f64()?)),
            _ => None,
        }
    }

    /// Central angle to `other`, in radians (haversine)
    pub fn angle_to(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Geocoded address, stored on bootcamps as `location`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    pub formatted_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

impl Location {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.coordinates[0], self.coordinates[1])
    }
}

/// Convert a distance in miles to a sphere-cap radius in radians
pub fn radius_radians(distance: &str) -> GeoResult<f64> {
    let miles: f64 = distance
        .trim()
        .parse()
        .map_err(|_| GeoError::InvalidDistance(distance.to_string()))?;
    if !miles.is_finite() || miles <= 0.0 {
        return Err(GeoError::InvalidDistance(distance.to_string()));
    }
    Ok(miles / EARTH_RADIUS_MILES)
}

/// Whether `point` lies inside the cap of `radians` around `center`
pub fn within_radius(center: &GeoPoint, point: &GeoPoint, radians: f64) -> bool {
    center.angle_to(point) <= radians
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Boston and Providence, roughly 41 miles apart
    const BOSTON: GeoPoint = GeoPoint {
        longitude: -71.0589,
        latitude: 42.3601,
    };
    const PROVIDENCE: GeoPoint = GeoPoint {
        longitude: -71.4128,
        latitude: 41.8240,
    };

    #[test]
    fn test_radius_radians() {
        assert_eq!(radius_radians("3963.2").unwrap(), 1.0);
        assert!(radius_radians("0").is_err());
        assert!(radius_radians("-5").is_err());
        assert!(radius_radians("far").is_err());
        assert!(radius_radians("inf").is_err());
    }

    #[test]
    fn test_within_radius() {
        let miles = BOSTON.angle_to(&PROVIDENCE) * EARTH_RADIUS_MILES;
        assert!((miles - 41.0).abs() < 2.0, "distance was {miles}");

        assert!(within_radius(&BOSTON, &PROVIDENCE, radius_radians("50").unwrap()));
        assert!(!within_radius(&BOSTON, &PROVIDENCE, radius_radians("30").unwrap()));
        assert!(within_radius(&BOSTON, &BOSTON, radius_radians("1").unwrap()));
    }

    #[test]
    fn test_point_from_record() {
        let record = json!({"location": {"type": "Point", "coordinates": [-71.1, 42.3]}});
        assert_eq!(GeoPoint::from_record(&record), Some(GeoPoint::new(-71.1, 42.3)));
        assert_eq!(GeoPoint::from_record(&json!({"name": "x"})), None);
    }
}
