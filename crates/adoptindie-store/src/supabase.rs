//! Supabase Storage adapter for the BlobStore port.
//!
//! Talks to the Storage REST API directly:
//! `POST   {url}/storage/v1/object/{bucket}/{key}` uploads,
//! `DELETE {url}/storage/v1/object/{bucket}/{key}` removes, and public
//! objects resolve at `{url}/storage/v1/object/public/{bucket}/{key}`.

use async_trait::async_trait;
use adoptindie_core::error::{AdoptError, Result};
use serde::Deserialize;

use crate::ports::{BlobStore, StoredBlob};

/// Seconds a CDN may cache an uploaded object
pub const CACHE_CONTROL_SECONDS: u32 = 3600;

/// Supabase Storage client bound to one bucket
pub struct SupabaseBlobStore {
    /// Project URL (e.g., "https://abcd.supabase.co")
    base_url: String,

    /// API key sent as both bearer token and `apikey` header
    api_key: String,

    bucket: String,

    client: reqwest::Client,
}

impl SupabaseBlobStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bucket: bucket.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    async fn error_from_response(action: &str, response: reqwest::Response) -> AdoptError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<StorageErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);
        AdoptError::BlobStore(format!("Supabase {} failed ({}): {}", action, status, message))
    }
}

#[async_trait]
impl BlobStore for SupabaseBlobStore {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<StoredBlob> {
        let size = data.len();

        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::CACHE_CONTROL, format!("max-age={}", CACHE_CONTROL_SECONDS))
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await
            .map_err(|e| {
                AdoptError::BlobStore(format!("Failed to reach Supabase Storage: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("upload", response).await);
        }

        tracing::debug!(bucket = %self.bucket, key = %key, size = size, "Uploaded object");

        Ok(StoredBlob { key: key.to_string(), public_url: self.public_url(key) })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                AdoptError::BlobStore(format!("Failed to reach Supabase Storage: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_response("delete", response).await);
        }

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, key)
    }

    fn backend_name(&self) -> &'static str {
        "supabase"
    }
}

/// Error body returned by the Storage API
#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store = SupabaseBlobStore::new("https://abcd.supabase.co/", "key", "bucket1");
        assert_eq!(
            store.object_url("uploads/1745406357610-black.jpg"),
            "https://abcd.supabase.co/storage/v1/object/bucket1/uploads/1745406357610-black.jpg"
        );
        assert_eq!(
            store.public_url("uploads/1745406357610-black.jpg"),
            "https://abcd.supabase.co/storage/v1/object/public/bucket1/uploads/1745406357610-black.jpg"
        );
        assert_eq!(store.bucket(), "bucket1");
        assert_eq!(store.backend_name(), "supabase");
    }

    #[test]
    fn test_error_body_parsing() {
        let body: StorageErrorBody =
            serde_json::from_str(r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#)
                .unwrap();
        assert_eq!(body.message.as_deref(), Some("The resource already exists"));
    }
}
