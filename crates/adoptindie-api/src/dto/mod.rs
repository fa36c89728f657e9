mod request;
mod response;

pub use request::{CreateSightingRequest, LocationInput, NearbyParams};
pub use response::{HealthResponse, UploadResponse};
