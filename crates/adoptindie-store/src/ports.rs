use async_trait::async_trait;
use adoptindie_core::error::Result;
use adoptindie_core::models::{NearbyQuery, NewSighting, SightingRecord};

/// Port for sighting record persistence and proximity search
#[async_trait]
pub trait SightingStore: Send + Sync {
    /// Persist a validated sighting and return it with its assigned id
    async fn insert(&self, sighting: NewSighting) -> Result<SightingRecord>;

    /// Find records within the query radius, nearest first
    ///
    /// Results honour the category filter and are capped at `query.limit`.
    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<SightingRecord>>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    /// Short backend name for logs and health responses
    fn backend_name(&self) -> &'static str;
}

/// Object written to a blob store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Key inside the bucket
    pub key: String,
    /// Publicly resolvable address of the object
    pub public_url: String,
}

/// Port for the external blob storage gateway
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`; existing keys are not overwritten
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<StoredBlob>;

    /// Remove an object; used to compensate a failed record insert
    async fn delete(&self, key: &str) -> Result<()>;

    /// Public address for a key
    fn public_url(&self, key: &str) -> String;

    /// Short backend name for logs and health responses
    fn backend_name(&self) -> &'static str;
}
