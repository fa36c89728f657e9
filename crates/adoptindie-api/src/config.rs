use adoptindie_core::config::{
    ServiceConfig, DEFAULT_CORS_ORIGINS, DEFAULT_PORT, DEFAULT_UPLOAD_MAX_BYTES,
};
use adoptindie_core::error::{AdoptError, Result};
use adoptindie_core::models::{DEFAULT_MAX_DISTANCE_M, DEFAULT_MAX_RESULTS};
use axum::http::HeaderValue;

/// HTTP-facing settings resolved from the layered service configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_origins: Vec<HeaderValue>,
    pub upload_max_bytes: usize,
    pub nearby: NearbySettings,
}

/// Defaults and caps applied to proximity queries
#[derive(Debug, Clone, Copy)]
pub struct NearbySettings {
    pub default_max_distance_m: f64,
    pub max_results: usize,
}

impl ApiConfig {
    pub fn from_service_config(config: &ServiceConfig) -> Result<Self> {
        let cors_origins = config
            .cors_origins
            .value
            .iter()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| AdoptError::ConfigInvalid {
                    key: "cors_origins".to_string(),
                    reason: format!("{}: {}", origin, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            bind_address: config.bind_address(),
            cors_origins,
            upload_max_bytes: config.upload_max_bytes.value,
            nearby: NearbySettings {
                default_max_distance_m: config.default_max_distance_m.value,
                max_results: config.max_results.value,
            },
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", DEFAULT_PORT),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| HeaderValue::from_static(*o)).collect(),
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            nearby: NearbySettings::default(),
        }
    }
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            default_max_distance_m: DEFAULT_MAX_DISTANCE_M,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}
