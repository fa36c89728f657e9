use adoptindie_core::models::{NewSighting, SightingRecord};
use adoptindie_store::ports::StoredBlob;
use chrono::Utc;

use crate::dto::CreateSightingRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// Name used when the client sends a file part without a file name
pub const DEFAULT_FILE_NAME: &str = "upload";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An image received from a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Service for storing images and sighting records
pub struct IngestService;

impl IngestService {
    /// Upload an image to the blob store under a fresh `uploads/` key
    pub async fn upload_image(state: &AppState, image: ImageUpload) -> Result<StoredBlob, ApiError> {
        let key = blob_key(image.file_name.as_deref(), Utc::now().timestamp_millis());
        let content_type = image.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
        let size = image.data.len();

        let blob = state.blob_store.upload(&key, image.data, content_type).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Image upload failed");
            ApiError::internal("File upload failed")
        })?;

        tracing::info!(key = %blob.key, size = size, "Stored image");

        Ok(blob)
    }

    /// Insert a validated sighting into the record store
    pub async fn create_sighting(
        state: &AppState,
        sighting: NewSighting,
    ) -> Result<SightingRecord, ApiError> {
        let record = state.sighting_store.insert(sighting).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to save sighting");
            ApiError::internal("Failed to save dog").with_details(e.to_string()).message_shape()
        })?;

        tracing::info!(id = %record.id, category = ?record.category, "Created sighting");

        Ok(record)
    }

    /// Validate, upload the image if any, then insert the record
    ///
    /// Nothing is stored when the metadata is invalid. When the insert fails
    /// after an upload, the uploaded object is deleted again; if that delete
    /// also fails the object is left orphaned and only logged.
    pub async fn report(
        state: &AppState,
        request: CreateSightingRequest,
        image: Option<ImageUpload>,
    ) -> Result<SightingRecord, ApiError> {
        let mut sighting = request
            .into_new_sighting()
            .map_err(|e| ApiError::from(e).message_shape())?;

        let blob = match image {
            Some(image) => {
                let blob = Self::upload_image(state, image).await.map_err(ApiError::message_shape)?;
                sighting.image_url = Some(blob.public_url.clone());
                Some(blob)
            }
            None => None,
        };

        match Self::create_sighting(state, sighting).await {
            Ok(record) => Ok(record),
            Err(err) => {
                if let Some(blob) = blob {
                    match state.blob_store.delete(&blob.key).await {
                        Ok(()) => tracing::warn!(key = %blob.key, "Removed image of failed report"),
                        Err(e) => tracing::error!(
                            error = %e,
                            key = %blob.key,
                            "Could not remove image of failed report, object is orphaned"
                        ),
                    }
                }
                Err(err)
            }
        }
    }
}

/// Object key for an upload: `uploads/{millis}-{name}`
///
/// Path separators in the client's file name are replaced so the key
/// always stays directly under `uploads/`.
pub fn blob_key(file_name: Option<&str>, millis: i64) -> String {
    let name: String = file_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_FILE_NAME)
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    format!("uploads/{}-{}", millis, name)
}
