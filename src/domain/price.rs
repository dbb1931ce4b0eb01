//! Fuel price payloads: raw inbound shape and the validated record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed format of the `lastupdated` field, e.g. `15/10/2023 08:01:47`.
pub const LAST_UPDATED_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// A price observation exactly as received on `raw.price`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrice {
    /// Code of the station the price belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stationcode: Option<Value>,
    /// Fuel type short code (`E10`, `U91`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fueltype: Option<Value>,
    /// Price, numeric or numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    /// Timestamp string in [`LAST_UPDATED_FORMAT`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastupdated: Option<Value>,
    /// Any other fields present in the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated price observation.
///
/// Identity is `(station_code, fuel_type, last_updated)`. Serializes with
/// the raw field names and the timestamp rendered back in
/// [`LAST_UPDATED_FORMAT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Referenced station code.
    #[serde(rename = "stationcode")]
    pub station_code: String,
    /// Fuel type short code.
    #[serde(rename = "fueltype")]
    pub fuel_type: String,
    /// Price within the accepted bounds.
    pub price: f64,
    /// When the upstream source last updated this price.
    #[serde(rename = "lastupdated", with = "last_updated_format")]
    pub last_updated: NaiveDateTime,
    /// Fields outside the known set, republished unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parses a `lastupdated` string.
///
/// # Errors
///
/// Returns the chrono parse error when the string does not match
/// [`LAST_UPDATED_FORMAT`].
pub fn parse_last_updated(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, LAST_UPDATED_FORMAT)
}

/// Serde adapter for `DD/MM/YYYY HH:MM:SS` timestamps.
pub mod last_updated_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::LAST_UPDATED_FORMAT;

    /// Serializes a timestamp in the upstream format.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(LAST_UPDATED_FORMAT))
    }

    /// Deserializes a timestamp from the upstream format.
    ///
    /// # Errors
    ///
    /// Fails when the string does not match the format.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, LAST_UPDATED_FORMAT).map_err(serde::de::Error::custom)
    }
}
