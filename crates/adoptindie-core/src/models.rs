pub mod geometry;
pub mod query;
pub mod sighting;

pub use geometry::GeoPoint;
pub use query::{NearbyQuery, DEFAULT_MAX_DISTANCE_M, DEFAULT_MAX_RESULTS};
pub use sighting::{NewSighting, SightingId, SightingRecord};
