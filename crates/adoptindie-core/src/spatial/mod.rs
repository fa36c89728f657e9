//! Spatial helpers: spherical distance, nearby ranking, coordinate parsing.

pub mod distance;
pub mod parse;

pub use distance::{haversine_distance, rank_nearby};
pub use parse::{coerce_number, parse_number, point_from_json, point_from_query};

use crate::error::Result;
use crate::models::GeoPoint;

/// Mean Earth radius in meters, the sphere used for all distance math
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Point `meters` north of `point` along its meridian
///
/// Fails when the result would pass the pole.
pub fn offset_north(point: &GeoPoint, meters: f64) -> Result<GeoPoint> {
    let delta = (meters / EARTH_RADIUS_M).to_degrees();
    GeoPoint::new(point.lng(), point.lat() + delta)
}
