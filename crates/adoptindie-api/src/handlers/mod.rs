mod dogs;
mod health;
mod upload;

pub use dogs::{create_dog, nearby_dogs, report_dog};
pub use health::health_check;
pub use upload::upload_file;
