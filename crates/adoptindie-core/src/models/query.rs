use serde::{Deserialize, Serialize};

use super::GeoPoint;
use crate::error::{AdoptError, Result};

/// Radius used when the caller does not give one
pub const DEFAULT_MAX_DISTANCE_M: f64 = 100_000.0;

/// Result cap used when the caller does not give one
pub const DEFAULT_MAX_RESULTS: usize = 500;

/// Proximity query against the record store
///
/// Matches records whose location lies within `max_distance_m` meters of
/// `center` on the sphere, optionally restricted to an exact category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub max_distance_m: f64,
    pub category: Option<String>,
    pub limit: usize,
}

impl NearbyQuery {
    /// Create a query around `center` with the default radius and cap
    pub fn new(center: GeoPoint) -> Self {
        Self {
            center,
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
            category: None,
            limit: DEFAULT_MAX_RESULTS,
        }
    }

    /// Set the radius in meters; must be finite and non-negative
    pub fn max_distance(mut self, meters: f64) -> Result<Self> {
        if !meters.is_finite() || meters < 0.0 {
            return Err(AdoptError::invalid_parameter(
                "maxDistance",
                format!("expected a non-negative number of meters, got {}", meters),
            ));
        }
        self.max_distance_m = meters;
        Ok(self)
    }

    /// Restrict to an exact category; empty strings mean no filter
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.is_empty());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Check a record's category against the filter
    pub fn matches_category(&self, category: Option<&str>) -> bool {
        match &self.category {
            Some(wanted) => category == Some(wanted.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> GeoPoint {
        GeoPoint::from_lat_lng(12.97, 77.59).unwrap()
    }

    #[test]
    fn test_query_defaults() {
        let query = NearbyQuery::new(center());
        assert_eq!(query.max_distance_m, 100_000.0);
        assert_eq!(query.limit, 500);
        assert!(query.category.is_none());
    }

    #[test]
    fn test_max_distance_validation() {
        assert!(NearbyQuery::new(center()).max_distance(-1.0).is_err());
        assert!(NearbyQuery::new(center()).max_distance(f64::NAN).is_err());
        assert_eq!(NearbyQuery::new(center()).max_distance(0.0).unwrap().max_distance_m, 0.0);
    }

    #[test]
    fn test_category_filter() {
        let query = NearbyQuery::new(center()).category(Some("Black".to_string()));
        assert!(query.matches_category(Some("Black")));
        assert!(!query.matches_category(Some("Brown")));
        assert!(!query.matches_category(Some("black")));
        assert!(!query.matches_category(None));

        let unfiltered = NearbyQuery::new(center()).category(Some(String::new()));
        assert!(unfiltered.category.is_none());
        assert!(unfiltered.matches_category(None));
    }
}
