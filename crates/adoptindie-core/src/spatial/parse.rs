//! Coercion of loosely-typed client input into coordinates.
//!
//! Query strings carry numbers as text and JSON clients sometimes send
//! `"12.5"` instead of `12.5`; both are accepted. Anything that is not a
//! finite number is rejected.

use serde_json::Value as JsonValue;

use crate::error::{AdoptError, Result};
use crate::models::GeoPoint;

/// Parse a required numeric query parameter
pub fn parse_number(name: &str, raw: Option<&str>) -> Result<f64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        AdoptError::invalid_parameter(name, "missing")
    })?;

    let value: f64 = raw
        .parse()
        .map_err(|_| AdoptError::invalid_parameter(name, format!("'{}' is not a number", raw)))?;

    if !value.is_finite() {
        return Err(AdoptError::invalid_parameter(name, format!("'{}' is not finite", raw)));
    }

    Ok(value)
}

/// Coerce a JSON value (number or numeric string) into a finite number
pub fn coerce_number(name: &str, value: Option<&JsonValue>) -> Result<f64> {
    match value {
        None | Some(JsonValue::Null) => Err(AdoptError::invalid_parameter(name, "missing")),
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| AdoptError::invalid_parameter(name, "not a finite number")),
        Some(JsonValue::String(s)) => parse_number(name, Some(s)),
        Some(other) => Err(AdoptError::invalid_parameter(
            name,
            format!("expected a number, got {}", json_kind(other)),
        )),
    }
}

/// Build a point from raw `lat`/`lng` query parameters
///
/// Every failure (missing, non-numeric, out of range) is reported as
/// `InvalidCoordinates`.
pub fn point_from_query(lat: Option<&str>, lng: Option<&str>) -> Result<GeoPoint> {
    let lat = parse_number("lat", lat).map_err(into_coordinate_error)?;
    let lng = parse_number("lng", lng).map_err(into_coordinate_error)?;
    GeoPoint::from_lat_lng(lat, lng)
}

/// Build a point from a JSON `{ "lat": .., "lng": .. }` object
pub fn point_from_json(lat: Option<&JsonValue>, lng: Option<&JsonValue>) -> Result<GeoPoint> {
    let lat = coerce_number("location.lat", lat).map_err(into_coordinate_error)?;
    let lng = coerce_number("location.lng", lng).map_err(into_coordinate_error)?;
    GeoPoint::from_lat_lng(lat, lng)
}

fn into_coordinate_error(err: AdoptError) -> AdoptError {
    match err {
        AdoptError::InvalidParameter { name, reason } => AdoptError::InvalidCoordinates {
            reason: format!("{} {}", name, reason),
        },
        other => other,
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("lat", Some("37.77")).unwrap(), 37.77);
        assert_eq!(parse_number("lat", Some(" -1 ")).unwrap(), -1.0);
        assert!(parse_number("lat", Some("abc")).is_err());
        assert!(parse_number("lat", Some("")).is_err());
        assert!(parse_number("lat", None).is_err());
        assert!(parse_number("lat", Some("NaN")).is_err());
        assert!(parse_number("lat", Some("inf")).is_err());
    }

    #[test]
    fn test_point_from_query_order() {
        let point = point_from_query(Some("37.77"), Some("-122.41")).unwrap();
        assert_eq!(point.coordinates(), [-122.41, 37.77]);
    }

    #[test]
    fn test_point_from_query_rejects_garbage() {
        let err = point_from_query(Some("abc"), Some("10")).unwrap_err();
        assert!(matches!(err, AdoptError::InvalidCoordinates { .. }));
        assert!(err.is_client_error());

        let err = point_from_query(Some("10"), None).unwrap_err();
        assert!(matches!(err, AdoptError::InvalidCoordinates { .. }));

        let err = point_from_query(Some("95"), Some("10")).unwrap_err();
        assert!(matches!(err, AdoptError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_point_from_json_coerces_strings() {
        let point = point_from_json(Some(&json!("12.5")), Some(&json!(77))).unwrap();
        assert_eq!(point.lat(), 12.5);
        assert_eq!(point.lng(), 77.0);
    }

    #[test]
    fn test_point_from_json_rejects_wrong_types() {
        assert!(point_from_json(Some(&json!(true)), Some(&json!(1))).is_err());
        assert!(point_from_json(Some(&json!(null)), Some(&json!(1))).is_err());
        assert!(point_from_json(Some(&json!([1])), Some(&json!(1))).is_err());
        assert!(point_from_json(None, Some(&json!(1))).is_err());
    }

    proptest! {
        #[test]
        fn prop_valid_range_is_accepted(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let lat_s = lat.to_string();
            let lng_s = lng.to_string();
            prop_assert!(point_from_query(Some(&lat_s), Some(&lng_s)).is_ok());
        }
    }
}
