use adoptindie_core::error::{AdoptError, Result};
use adoptindie_core::models::{NearbyQuery, SightingRecord};
use adoptindie_core::spatial::{parse_number, point_from_query};

use crate::config::NearbySettings;
use crate::dto::NearbyParams;
use crate::error::ApiError;
use crate::state::AppState;

/// Service for proximity queries
pub struct NearbyService;

impl NearbyService {
    /// Validate raw query parameters into a query
    ///
    /// Blank `maxDistance`, `type` and `limit` count as absent. The result
    /// cap from `settings` always applies; `limit` can only lower it.
    pub fn build_query(params: &NearbyParams, settings: &NearbySettings) -> Result<NearbyQuery> {
        let center = point_from_query(params.lat.as_deref(), params.lng.as_deref())?;

        let max_distance = match non_blank(params.max_distance.as_deref()) {
            Some(raw) => parse_number("maxDistance", Some(raw))?,
            None => settings.default_max_distance_m,
        };

        let limit = match non_blank(params.limit.as_deref()) {
            Some(raw) => parse_limit(raw)?.min(settings.max_results),
            None => settings.max_results,
        };

        Ok(NearbyQuery::new(center)
            .max_distance(max_distance)?
            .category(params.category.clone())
            .limit(limit))
    }

    /// Run a validated query against the record store
    pub async fn execute(
        state: &AppState,
        query: &NearbyQuery,
    ) -> std::result::Result<Vec<SightingRecord>, ApiError> {
        let records = state.sighting_store.find_nearby(query).await.map_err(|e| {
            tracing::error!(error = %e, "Nearby query failed");
            ApiError::internal("Error fetching nearby dogs")
                .with_details(e.to_string())
                .message_shape()
        })?;

        tracing::info!(
            lat = query.center.lat(),
            lng = query.center.lng(),
            max_distance_m = query.max_distance_m,
            category = query.category.as_deref().unwrap_or("*"),
            results = records.len(),
            "Nearby query"
        );

        Ok(records)
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_limit(raw: &str) -> Result<usize> {
    match raw.parse::<usize>() {
        Ok(0) | Err(_) => Err(AdoptError::invalid_parameter(
            "limit",
            format!("'{}' is not a positive integer", raw),
        )),
        Ok(n) => Ok(n),
    }
}
