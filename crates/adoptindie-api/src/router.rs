use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>, config: &ApiConfig) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))

        // Images
        .route("/upload", post(handlers::upload_file))

        // Dogs
        .route("/api/dogs", post(handlers::create_dog))
        .route("/api/dogs/report", post(handlers::report_dog))
        .route("/api/dogs/nearby", get(handlers::nearby_dogs))

        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.upload_max_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
