//! In-memory storage implementations for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For production workloads, use the PostgreSQL and
//! Supabase backends.

use async_trait::async_trait;
use adoptindie_core::error::{AdoptError, Result};
use adoptindie_core::models::{NearbyQuery, NewSighting, SightingId, SightingRecord};
use adoptindie_core::spatial::rank_nearby;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ports::{BlobStore, SightingStore, StoredBlob};

/// In-memory implementation of SightingStore
///
/// Proximity search is a full scan with Haversine distances.
#[derive(Debug, Clone, Default)]
pub struct MemorySightingStore {
    records: Arc<RwLock<HashMap<SightingId, SightingRecord>>>,
}

impl MemorySightingStore {
    /// Create a new in-memory sighting store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SightingStore for MemorySightingStore {
    async fn insert(&self, sighting: NewSighting) -> Result<SightingRecord> {
        let mut records = self.records.write().unwrap();

        let id = SightingId::generate();
        let record = sighting.into_record(id);
        records.insert(id, record.clone());

        Ok(record)
    }

    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<SightingRecord>> {
        let records = self.records.read().unwrap();
        Ok(rank_nearby(records.values(), query))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// In-memory implementation of BlobStore
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    public_base_url: String,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryBlobStore {
    /// Create a store whose public URLs are `{public_base_url}/{key}`
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Bytes and content type stored under `key`
    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        let objects = self.objects.read().unwrap();
        objects.get(key).map(|o| (o.data.clone(), o.content_type.clone()))
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let objects = self.objects.read().unwrap();
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<StoredBlob> {
        let mut objects = self.objects.write().unwrap();

        if objects.contains_key(key) {
            return Err(AdoptError::BlobStore(format!("Object already exists: {}", key)));
        }

        objects.insert(
            key.to_string(),
            StoredObject { data, content_type: content_type.to_string() },
        );

        Ok(StoredBlob { key: key.to_string(), public_url: self.public_url(key) })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut objects = self.objects.write().unwrap();
        objects.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adoptindie_core::models::GeoPoint;
    use adoptindie_core::spatial::offset_north;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::from_lat_lng(lat, lng).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_keeps_fields() {
        let store = MemorySightingStore::new();
        let sighting = NewSighting::new(point(37.77, -122.41))
            .with_category("Brown")
            .with_email("finder@example.com");

        let record = store.insert(sighting).await.unwrap();

        assert_eq!(record.category.as_deref(), Some("Brown"));
        assert_eq!(record.email.as_deref(), Some("finder@example.com"));
        assert_eq!(record.location.coordinates(), [-122.41, 37.77]);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_exact_point_within_ten_meters() {
        let store = MemorySightingStore::new();
        let record = store.insert(NewSighting::new(point(37.77, -122.41))).await.unwrap();

        let query = NearbyQuery::new(point(37.77, -122.41)).max_distance(10.0).unwrap();
        let hits = store.find_nearby(&query).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, record.id);
        assert_eq!(hits[0].location.coordinates(), [-122.41, 37.77]);
    }

    #[tokio::test]
    async fn test_category_excluded_even_within_radius() {
        let store = MemorySightingStore::new();
        store
            .insert(NewSighting::new(point(37.77, -122.41)).with_category("Brown"))
            .await
            .unwrap();

        let query = NearbyQuery::new(point(37.77, -122.41)).category(Some("Black".to_string()));
        assert!(store.find_nearby(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nearby_ordering_and_radius() {
        let store = MemorySightingStore::new();
        let center = point(51.5074, -0.1278);

        let far = store
            .insert(NewSighting::new(offset_north(&center, 200_000.0).unwrap()))
            .await
            .unwrap();
        let mid = store
            .insert(NewSighting::new(offset_north(&center, 500.0).unwrap()))
            .await
            .unwrap();
        let here = store.insert(NewSighting::new(center)).await.unwrap();

        let query = NearbyQuery::new(center);
        let ids: Vec<_> = store.find_nearby(&query).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![here.id, mid.id]);

        let query = NearbyQuery::new(center).max_distance(1_000_000.0).unwrap();
        let ids: Vec<_> = store.find_nearby(&query).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![here.id, mid.id, far.id]);
    }

    #[tokio::test]
    async fn test_blob_upload_and_delete() {
        let blobs = MemoryBlobStore::new("http://localhost:5000/files/");

        let stored = blobs
            .upload("uploads/1-dog.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(stored.key, "uploads/1-dog.jpg");
        assert_eq!(stored.public_url, "http://localhost:5000/files/uploads/1-dog.jpg");
        assert_eq!(
            blobs.get("uploads/1-dog.jpg"),
            Some((vec![1, 2, 3], "image/jpeg".to_string()))
        );

        blobs.delete("uploads/1-dog.jpg").await.unwrap();
        assert!(blobs.keys().is_empty());
    }

    #[tokio::test]
    async fn test_blob_upload_does_not_overwrite() {
        let blobs = MemoryBlobStore::new("http://cdn");
        blobs.upload("uploads/a.jpg", vec![1], "image/jpeg").await.unwrap();

        let err = blobs.upload("uploads/a.jpg", vec![2], "image/jpeg").await.unwrap_err();
        assert!(matches!(err, AdoptError::BlobStore(_)));
        assert_eq!(blobs.get("uploads/a.jpg").unwrap().0, vec![1]);
    }
}
