use serde::Serialize;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub storage: &'static str,
    pub blob_storage: &'static str,
}

impl HealthResponse {
    pub fn new(healthy: bool, storage: &'static str, blob_storage: &'static str) -> Self {
        Self {
            status: if healthy { "ok" } else { "degraded" },
            service: "adoptindie-api",
            storage,
            blob_storage,
        }
    }
}
