use std::sync::Arc;

use adoptindie_core::models::SightingRecord;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::dto::{CreateSightingRequest, NearbyParams};
use crate::error::ApiError;
use crate::handlers::upload::read_form;
use crate::services::{IngestService, NearbyService};
use crate::state::AppState;

pub async fn create_dog(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSightingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SightingRecord>), ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::bad_request(rejection.body_text()).message_shape()
    })?;

    let sighting = request.into_new_sighting().map_err(|e| ApiError::from(e).message_shape())?;
    let record = IngestService::create_sighting(&state, sighting).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn report_dog(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<SightingRecord>), ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        ApiError::bad_request("Missing report data")
            .with_details(rejection.body_text())
            .message_shape()
    })?;
    let form = read_form(&mut multipart).await.map_err(ApiError::message_shape)?;

    let data = form
        .data
        .ok_or_else(|| ApiError::bad_request("Missing report data").message_shape())?;
    let request: CreateSightingRequest = serde_json::from_str(&data).map_err(|e| {
        ApiError::bad_request("Invalid report data").with_details(e.to_string()).message_shape()
    })?;

    tracing::info!(has_file = form.file.is_some(), "Processing dog report");

    let record = IngestService::report(&state, request, form.file).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn nearby_dogs(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<Vec<SightingRecord>>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        ApiError::bad_request(rejection.body_text()).message_shape()
    })?;

    let query = NearbyService::build_query(&params, &state.nearby)
        .map_err(|e| ApiError::from(e).message_shape())?;

    let records = NearbyService::execute(&state, &query).await?;

    Ok(Json(records))
}
