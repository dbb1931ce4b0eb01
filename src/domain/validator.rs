//! Structural and semantic validation of raw records.
//!
//! Both entry points are total and side-effect free: they either return a
//! normalized record or a [`ValidationError`] naming why the record was
//! rejected. Rejected records are never retried.
//!
//! Check order follows the upstream cleaning rules:
//!
//! - stations: coordinate coercion first, then the null scan over every
//!   field except `stationid` and `brandid`;
//! - prices: price type and bounds, then the timestamp format, then the null
//!   scan over every field.

use std::ops::RangeInclusive;

use serde_json::{Map, Value};

use super::price::{PriceRecord, RawPrice, parse_last_updated};
use super::station::{Location, RawStation, StationRecord};

/// Inclusive bounds for an accepted price.
pub const PRICE_BOUNDS: RangeInclusive<f64> = 0.0..=1000.0;

/// Reason a raw record was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A field could not be coerced to the required type.
    #[error("field `{field}` has the wrong type")]
    TypeError {
        /// Offending field.
        field: &'static str,
    },

    /// A numeric field parsed but lies outside its domain.
    #[error("field `{field}` out of range: {value}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// The parsed value.
        value: f64,
    },

    /// The timestamp does not match `DD/MM/YYYY HH:MM:SS`.
    #[error("bad timestamp: {value}")]
    BadTimestamp {
        /// The raw timestamp as received.
        value: String,
    },

    /// A required field is missing, null or empty.
    #[error("field `{field}` is null or empty")]
    NullField {
        /// Offending field.
        field: String,
    },
}

impl ValidationError {
    /// Returns the rejection category used in logs and outcome reports.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::TypeError { .. } => "type_error",
            Self::OutOfRange { .. } => "out_of_range",
            Self::BadTimestamp { .. } => "bad_timestamp",
            Self::NullField { .. } => "null_field",
        }
    }
}

/// Validates and normalizes a raw station.
///
/// # Errors
///
/// - [`ValidationError::TypeError`] if a coordinate is not a finite number or
///   numeric string, or a text field is not a scalar;
/// - [`ValidationError::NullField`] if any field other than `stationid` and
///   `brandid` is missing, null or empty.
pub fn validate_station(raw: &RawStation) -> Result<StationRecord, ValidationError> {
    let location = match raw.location.as_ref() {
        Some(Value::Object(fields)) if !fields.is_empty() => Some(Location {
            latitude: coordinate(fields.get("latitude"), "latitude")?,
            longitude: coordinate(fields.get("longitude"), "longitude")?,
        }),
        None | Some(Value::Null) | Some(Value::Object(_)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(_) => return Err(ValidationError::TypeError { field: "location" }),
    };

    let station_id = text(raw.stationid.as_ref(), "stationid")?;
    let brand_id = text(raw.brandid.as_ref(), "brandid")?;
    let brand = required_text(raw.brand.as_ref(), "brand")?;
    let code = required_text(raw.code.as_ref(), "code")?;
    let name = required_text(raw.name.as_ref(), "name")?;
    let address = required_text(raw.address.as_ref(), "address")?;
    let location = location.ok_or_else(|| null_field("location"))?;
    scan_extra(&raw.extra)?;

    Ok(StationRecord {
        station_id,
        brand_id,
        brand,
        code,
        name,
        address,
        location,
        extra: raw.extra.clone(),
    })
}

/// Validates and normalizes a raw price.
///
/// # Errors
///
/// - [`ValidationError::TypeError`] if `price` is missing or not numeric;
/// - [`ValidationError::OutOfRange`] if `price` is outside [`PRICE_BOUNDS`];
/// - [`ValidationError::BadTimestamp`] if `lastupdated` does not parse;
/// - [`ValidationError::NullField`] if any field is missing, null or empty.
pub fn validate_price(raw: &RawPrice) -> Result<PriceRecord, ValidationError> {
    let price =
        number(raw.price.as_ref()).ok_or(ValidationError::TypeError { field: "price" })?;
    if !PRICE_BOUNDS.contains(&price) {
        return Err(ValidationError::OutOfRange {
            field: "price",
            value: price,
        });
    }

    let last_updated = match raw.lastupdated.as_ref() {
        Some(Value::String(s)) => {
            parse_last_updated(s).map_err(|_| ValidationError::BadTimestamp { value: s.clone() })?
        }
        None | Some(Value::Null) => return Err(null_field("lastupdated")),
        Some(other) => {
            return Err(ValidationError::BadTimestamp {
                value: other.to_string(),
            });
        }
    };

    let station_code = required_text(raw.stationcode.as_ref(), "stationcode")?;
    let fuel_type = required_text(raw.fueltype.as_ref(), "fueltype")?;
    scan_extra(&raw.extra)?;

    Ok(PriceRecord {
        station_code,
        fuel_type,
        price,
        last_updated,
        extra: raw.extra.clone(),
    })
}

/// Coerces a JSON number or numeric string to `f64`.
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coordinate(value: Option<&Value>, field: &'static str) -> Result<f64, ValidationError> {
    number(value)
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::TypeError { field })
}

/// Reads an optional scalar text field. Numbers are accepted and rendered
/// as text; null and `""` read as absent.
fn text(value: Option<&Value>, field: &'static str) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(ValidationError::TypeError { field }),
    }
}

fn required_text(value: Option<&Value>, field: &'static str) -> Result<String, ValidationError> {
    text(value, field)?.ok_or_else(|| null_field(field))
}

fn scan_extra(extra: &Map<String, Value>) -> Result<(), ValidationError> {
    match extra.iter().find(|(_, v)| is_blank(v)) {
        Some((key, _)) => Err(ValidationError::NullField { field: key.clone() }),
        None => Ok(()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn null_field(field: &str) -> ValidationError {
    ValidationError::NullField {
        field: field.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_station(value: Value) -> RawStation {
        let Ok(raw) = serde_json::from_value(value) else {
            panic!("raw station should deserialize");
        };
        raw
    }

    fn raw_price(value: Value) -> RawPrice {
        let Ok(raw) = serde_json::from_value(value) else {
            panic!("raw price should deserialize");
        };
        raw
    }

    fn station_json() -> Value {
        json!({
            "stationid": "1-GDV5-1",
            "brandid": "1-B1",
            "brand": "BP",
            "code": "X1",
            "name": "BP Ultimo",
            "address": "1 Harris St, Ultimo NSW 2007",
            "location": { "latitude": "-33.8", "longitude": "151.2" },
        })
    }

    fn price_json() -> Value {
        json!({
            "stationcode": "X1",
            "fueltype": "E10",
            "price": 180.5,
            "lastupdated": "01/01/2024 10:00:00",
        })
    }

    #[test]
    fn station_coordinates_are_coerced() {
        let Ok(record) = validate_station(&raw_station(station_json())) else {
            panic!("station should validate");
        };
        assert_eq!(record.code, "X1");
        assert!((record.latitude() - -33.8).abs() < f64::EPSILON);
        assert!((record.longitude() - 151.2).abs() < f64::EPSILON);
        assert_eq!(record.station_id.as_deref(), Some("1-GDV5-1"));
    }

    #[test]
    fn station_validation_is_identity_on_clean_records() {
        let Ok(first) = validate_station(&raw_station(station_json())) else {
            panic!("station should validate");
        };
        let Ok(republished) = serde_json::to_value(&first) else {
            panic!("serialization failed");
        };
        let Ok(second) = validate_station(&raw_station(republished)) else {
            panic!("clean station should validate again");
        };
        assert_eq!(first, second);
    }

    #[test]
    fn station_ids_are_optional() {
        let mut value = station_json();
        value["stationid"] = Value::Null;
        value["brandid"] = json!("");
        let Ok(record) = validate_station(&raw_station(value)) else {
            panic!("station without ids should validate");
        };
        assert!(record.station_id.is_none());
        assert!(record.brand_id.is_none());
    }

    #[test]
    fn numeric_ids_are_rendered_as_text() {
        let mut value = station_json();
        value["stationid"] = json!(1234);
        value["code"] = json!(17);
        let Ok(record) = validate_station(&raw_station(value)) else {
            panic!("station should validate");
        };
        assert_eq!(record.station_id.as_deref(), Some("1234"));
        assert_eq!(record.code, "17");
    }

    #[test]
    fn non_numeric_latitude_is_type_error() {
        let mut value = station_json();
        value["location"]["latitude"] = json!("north");
        let result = validate_station(&raw_station(value));
        assert_eq!(
            result,
            Err(ValidationError::TypeError { field: "latitude" })
        );
    }

    #[test]
    fn non_finite_longitude_is_type_error() {
        let mut value = station_json();
        value["location"]["longitude"] = json!("NaN");
        let Err(err) = validate_station(&raw_station(value)) else {
            panic!("NaN longitude should be rejected");
        };
        assert_eq!(err.reason(), "type_error");
    }

    #[test]
    fn null_coordinate_is_type_error() {
        let mut value = station_json();
        value["location"]["latitude"] = Value::Null;
        let Err(err) = validate_station(&raw_station(value)) else {
            panic!("null latitude should be rejected");
        };
        assert_eq!(err.reason(), "type_error");
    }

    #[test]
    fn coordinate_type_error_wins_over_null_fields() {
        let mut value = station_json();
        value["location"]["latitude"] = json!("x");
        value["name"] = json!("");
        let Err(err) = validate_station(&raw_station(value)) else {
            panic!("station should be rejected");
        };
        assert_eq!(err.reason(), "type_error");
    }

    #[test]
    fn empty_required_station_field_is_null_field() {
        for field in ["brand", "code", "name", "address"] {
            let mut value = station_json();
            value[field] = json!("");
            let result = validate_station(&raw_station(value));
            assert_eq!(
                result,
                Err(ValidationError::NullField {
                    field: field.to_string()
                }),
                "field {field}"
            );
        }
    }

    #[test]
    fn missing_location_is_null_field() {
        let mut value = station_json();
        value["location"] = Value::Null;
        let Err(err) = validate_station(&raw_station(value)) else {
            panic!("station without location should be rejected");
        };
        assert_eq!(err.reason(), "null_field");
    }

    #[test]
    fn blank_extra_station_field_is_null_field() {
        let mut value = station_json();
        value["state"] = Value::Null;
        let result = validate_station(&raw_station(value));
        assert_eq!(
            result,
            Err(ValidationError::NullField {
                field: "state".to_string()
            })
        );
    }

    #[test]
    fn unknown_fields_are_carried_into_records() {
        let mut station = station_json();
        station["state"] = json!("NSW");
        let Ok(record) = validate_station(&raw_station(station)) else {
            panic!("station should validate");
        };
        assert_eq!(record.extra.get("state"), Some(&json!("NSW")));

        let mut price = price_json();
        price["source"] = json!("fuelcheck");
        let Ok(record) = validate_price(&raw_price(price)) else {
            panic!("price should validate");
        };
        let Ok(republished) = serde_json::to_value(&record) else {
            panic!("serialization failed");
        };
        assert_eq!(republished["source"], json!("fuelcheck"));
    }

    #[test]
    fn valid_price_is_normalized() {
        let Ok(record) = validate_price(&raw_price(price_json())) else {
            panic!("price should validate");
        };
        assert_eq!(record.station_code, "X1");
        assert_eq!(record.fuel_type, "E10");
        assert!((record.price - 180.5).abs() < f64::EPSILON);
    }

    #[test]
    fn string_price_is_coerced() {
        let mut value = price_json();
        value["price"] = json!("175.9");
        let Ok(record) = validate_price(&raw_price(value)) else {
            panic!("numeric string price should validate");
        };
        assert!((record.price - 175.9).abs() < f64::EPSILON);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        for price in [0.0, 1000.0] {
            let mut value = price_json();
            value["price"] = json!(price);
            assert!(validate_price(&raw_price(value)).is_ok(), "price {price}");
        }
    }

    #[test]
    fn price_outside_bounds_is_rejected() {
        for price in [-0.01, 1000.01, -250.0, 99_999.0] {
            let mut value = price_json();
            value["price"] = json!(price);
            let Err(err) = validate_price(&raw_price(value)) else {
                panic!("price {price} should be rejected");
            };
            assert_eq!(err.reason(), "out_of_range");
        }
    }

    #[test]
    fn non_numeric_price_is_type_error() {
        for bad in [json!("cheap"), Value::Null, json!(true), json!([1])] {
            let mut value = price_json();
            value["price"] = bad;
            let result = validate_price(&raw_price(value));
            assert_eq!(result, Err(ValidationError::TypeError { field: "price" }));
        }
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        for bad in ["2024-01-01 10:00:00", "01/13/2024 10:00:00", "yesterday"] {
            let mut value = price_json();
            value["lastupdated"] = json!(bad);
            let result = validate_price(&raw_price(value));
            assert_eq!(
                result,
                Err(ValidationError::BadTimestamp {
                    value: bad.to_string()
                })
            );
        }
    }

    #[test]
    fn empty_price_fields_are_null_field() {
        for field in ["stationcode", "fueltype"] {
            let mut value = price_json();
            value[field] = json!("");
            let Err(err) = validate_price(&raw_price(value)) else {
                panic!("empty {field} should be rejected");
            };
            assert_eq!(err.reason(), "null_field", "field {field}");
        }
    }

    #[test]
    fn price_checked_before_timestamp_and_nulls() {
        let value = json!({
            "stationcode": "",
            "fueltype": "E10",
            "price": 5000,
            "lastupdated": "not a date",
        });
        let Err(err) = validate_price(&raw_price(value)) else {
            panic!("price should be rejected");
        };
        assert_eq!(err.reason(), "out_of_range");
    }
}
