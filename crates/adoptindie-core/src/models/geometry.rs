//! Geographic point type shared by every crate.
//!
//! Points serialize as GeoJSON-style `{"type": "Point", "coordinates": [lng, lat]}`,
//! which is also the storage order. Callers usually think in (lat, lng), so
//! constructors are explicit about the order they take.

use serde::{Deserialize, Serialize};

use crate::error::{AdoptError, Result};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A validated WGS 84 point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointRepr", into = "PointRepr")]
pub struct GeoPoint {
    lng: f64,
    lat: f64,
}

impl GeoPoint {
    /// Create a point from (longitude, latitude)
    pub fn new(lng: f64, lat: f64) -> Result<Self> {
        validate_longitude(lng)?;
        validate_latitude(lat)?;
        Ok(Self { lng, lat })
    }

    /// Create a point from (latitude, longitude)
    pub fn from_lat_lng(lat: f64, lng: f64) -> Result<Self> {
        Self::new(lng, lat)
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Coordinates in storage order: `[lng, lat]`
    pub fn coordinates(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.lng, point.lat)
    }
}

fn validate_latitude(lat: f64) -> Result<()> {
    if !lat.is_finite() {
        return Err(AdoptError::InvalidCoordinates {
            reason: "latitude must be a finite number".to_string(),
        });
    }
    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) {
        return Err(AdoptError::InvalidCoordinates {
            reason: format!("latitude {} outside [{}, {}]", lat, MIN_LATITUDE, MAX_LATITUDE),
        });
    }
    Ok(())
}

fn validate_longitude(lng: f64) -> Result<()> {
    if !lng.is_finite() {
        return Err(AdoptError::InvalidCoordinates {
            reason: "longitude must be a finite number".to_string(),
        });
    }
    if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lng) {
        return Err(AdoptError::InvalidCoordinates {
            reason: format!("longitude {} outside [{}, {}]", lng, MIN_LONGITUDE, MAX_LONGITUDE),
        });
    }
    Ok(())
}

/// Wire representation of a point
#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum PointRepr {
    Point { coordinates: [f64; 2] },
}

impl TryFrom<PointRepr> for GeoPoint {
    type Error = AdoptError;

    fn try_from(repr: PointRepr) -> Result<Self> {
        let PointRepr::Point { coordinates: [lng, lat] } = repr;
        GeoPoint::new(lng, lat)
    }
}

impl From<GeoPoint> for PointRepr {
    fn from(point: GeoPoint) -> Self {
        PointRepr::Point { coordinates: point.coordinates() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serialization_order() {
        let point = GeoPoint::from_lat_lng(37.77, -122.41).unwrap();
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Point", "coordinates": [-122.41, 37.77]}));

        let parsed: GeoPoint = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, point);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(GeoPoint::new(180.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -90.01).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_accepts_boundaries() {
        assert!(GeoPoint::new(-180.0, -90.0).is_ok());
        assert!(GeoPoint::new(180.0, 90.0).is_ok());
    }

    #[test]
    fn test_deserialize_rejects_bad_coordinates() {
        let json = serde_json::json!({"type": "Point", "coordinates": [10.0, 95.0]});
        assert!(serde_json::from_value::<GeoPoint>(json).is_err());

        let json = serde_json::json!({"type": "LineString", "coordinates": [10.0, 5.0]});
        assert!(serde_json::from_value::<GeoPoint>(json).is_err());
    }
}
