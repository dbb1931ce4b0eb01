//! Fuel station payloads: raw inbound shape and the validated record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A station observation exactly as received on `raw.station`.
///
/// Every known field is kept as an untyped JSON value so the validator can
/// tell a missing field from a null one from a mistyped one. Unknown fields
/// are retained in `extra` and take part in the null scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStation {
    /// Upstream station identifier (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stationid: Option<Value>,
    /// Upstream brand identifier (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brandid: Option<Value>,
    /// Brand name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Value>,
    /// Station code, the station's unique key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    /// Object with `latitude` and `longitude`, numeric or numeric strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    /// Any other fields present in the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Geographic position of a station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// A validated fuel station.
///
/// Serializes with the same shape as the raw payload, extra fields
/// included, with the location coordinates coerced to numbers. Keyed by
/// `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Upstream station identifier, if provided.
    #[serde(rename = "stationid")]
    pub station_id: Option<String>,
    /// Upstream brand identifier, if provided.
    #[serde(rename = "brandid")]
    pub brand_id: Option<String>,
    /// Brand name.
    pub brand: String,
    /// Station code (unique key).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Coordinates.
    pub location: Location,
    /// Fields outside the known set, republished unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StationRecord {
    /// Latitude shortcut.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.latitude
    }

    /// Longitude shortcut.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.longitude
    }
}
