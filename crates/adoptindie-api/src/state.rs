use adoptindie_store::ports::{BlobStore, SightingStore};
use std::sync::Arc;

use crate::config::NearbySettings;

#[derive(Clone)]
pub struct AppState {
    pub sighting_store: Arc<dyn SightingStore>,
    pub blob_store: Arc<dyn BlobStore>,
    pub nearby: NearbySettings,
}

impl AppState {
    pub fn new(
        sighting_store: Arc<dyn SightingStore>,
        blob_store: Arc<dyn BlobStore>,
        nearby: NearbySettings,
    ) -> Self {
        Self {
            sighting_store,
            blob_store,
            nearby,
        }
    }
}
