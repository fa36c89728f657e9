use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = match state.sighting_store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Record store health check failed");
            false
        }
    };

    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = HealthResponse::new(
        healthy,
        state.sighting_store.backend_name(),
        state.blob_store.backend_name(),
    );

    (status, Json(body))
}
