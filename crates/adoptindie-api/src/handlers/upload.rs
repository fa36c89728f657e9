use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    Json,
};

use crate::dto::UploadResponse;
use crate::error::ApiError;
use crate::services::{ImageUpload, IngestService};
use crate::state::AppState;

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    // Anything that is not a form cannot carry a file
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Upload without multipart body");
        ApiError::bad_request("No file uploaded")
    })?;
    let form = read_form(&mut multipart).await?;

    let image = form.file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    tracing::info!(
        file_name = ?image.file_name,
        size = image.data.len(),
        "Received file for upload"
    );

    let blob = IngestService::upload_image(&state, image).await?;

    Ok(Json(UploadResponse { download_url: blob.public_url }))
}

/// Parts of a sighting form: an optional image and optional JSON metadata
#[derive(Debug, Default)]
pub(crate) struct SightingForm {
    pub file: Option<ImageUpload>,
    pub data: Option<String>,
}

/// Read the `file` and `data` parts, ignoring anything else
///
/// A `file` part with neither content nor a file name (what browsers send
/// when nothing was picked) counts as no file. Empty named files are kept.
pub(crate) async fn read_form(multipart: &mut Multipart) -> Result<SightingForm, ApiError> {
    let mut form = SightingForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                let nothing_picked =
                    data.is_empty() && file_name.as_deref().map_or(true, str::is_empty);
                if !nothing_picked {
                    form.file = Some(ImageUpload { file_name, content_type, data: data.to_vec() });
                }
            }
            "data" => {
                form.data = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), "Failed to parse multipart form").with_details(err.body_text())
}
