use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::GeoPoint;

/// Identifier assigned by the record store at insert time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SightingId(pub Uuid);

impl SightingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SightingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A persisted dog sighting
///
/// Field names on the wire follow the map client: `_id`, `imageUrl`, `type`
/// for the coat category and `timestamp` for the creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightingRecord {
    #[serde(rename = "_id")]
    pub id: SightingId,

    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub location: GeoPoint,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A validated sighting that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewSighting {
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub location: GeoPoint,
    pub age: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewSighting {
    /// Create a sighting at `location`, stamped with the current time
    pub fn new(location: GeoPoint) -> Self {
        Self {
            image_url: None,
            category: None,
            location,
            age: None,
            email: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Attach the store-assigned identifier
    pub fn into_record(self, id: SightingId) -> SightingRecord {
        SightingRecord {
            id,
            image_url: self.image_url,
            category: self.category,
            location: self.location,
            age: self.age,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_format() {
        let location = GeoPoint::from_lat_lng(37.77, -122.41).unwrap();
        let id = SightingId::generate();
        let record = NewSighting::new(location)
            .with_category("Brown")
            .with_phone("555-0100")
            .into_record(id);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["_id"], serde_json::json!(id.to_string()));
        assert_eq!(json["type"], "Brown");
        assert_eq!(json["phone"], "555-0100");
        assert_eq!(json["location"]["coordinates"], serde_json::json!([-122.41, 37.77]));
        assert!(json.get("timestamp").is_some());
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_record_deserializes_from_wire() {
        let json = serde_json::json!({
            "_id": "0b6c3f64-98a4-4f2e-9a55-1b3f7d3f2a10",
            "imageUrl": "https://cdn.example/uploads/1-dog.jpg",
            "location": {"type": "Point", "coordinates": [77.59, 12.97]},
            "timestamp": "2025-04-23T10:00:00Z"
        });

        let record: SightingRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.location.lat(), 12.97);
        assert_eq!(record.image_url.as_deref(), Some("https://cdn.example/uploads/1-dog.jpg"));
        assert!(record.category.is_none());
    }
}
