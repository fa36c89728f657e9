use adoptindie_core::error::{AdoptError, Result};
use adoptindie_core::models::NewSighting;
use adoptindie_core::spatial::point_from_json;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Query string of `GET /api/dogs/nearby`
///
/// Everything is kept as text so parsing failures become 400s with a
/// useful message instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    #[serde(rename = "maxDistance")]
    pub max_distance: Option<String>,
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub limit: Option<String>,
}

/// `{ "lat": .., "lng": .. }` as sent by the client
#[derive(Debug, Default, Deserialize)]
pub struct LocationInput {
    pub lat: Option<JsonValue>,
    pub lng: Option<JsonValue>,
}

/// Body of `POST /api/dogs` and the `data` part of `POST /api/dogs/report`
///
/// Unknown fields (including client-sent ids or timestamps) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSightingRequest {
    pub location: Option<LocationInput>,

    #[serde(rename = "imageUrl", default, deserialize_with = "loose_string")]
    pub image_url: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "loose_string")]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    pub age: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    pub phone: Option<String>,
}

impl CreateSightingRequest {
    /// Validate the location and build a sighting stamped with the current time
    pub fn into_new_sighting(self) -> Result<NewSighting> {
        let location = self.location.ok_or_else(|| AdoptError::InvalidCoordinates {
            reason: "location is required".to_string(),
        })?;
        let point = point_from_json(location.lat.as_ref(), location.lng.as_ref())?;

        let mut sighting = NewSighting::new(point);
        sighting.image_url = self.image_url;
        sighting.category = self.category;
        sighting.age = self.age;
        sighting.email = self.email;
        sighting.phone = self.phone;
        Ok(sighting)
    }
}

/// Accept strings, numbers and booleans for free-text fields
fn loose_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(JsonValue::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, got {}",
            if other.is_array() { "an array" } else { "an object" }
        ))),
    }
}
