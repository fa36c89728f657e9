mod ingest;
mod nearby;

pub use ingest::{blob_key, ImageUpload, IngestService, DEFAULT_FILE_NAME};
pub use nearby::NearbyService;
