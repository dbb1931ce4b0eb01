//! Database row models for stations and prices.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::domain::{Location, StationRecord};

/// Column tuple of a `station` row, in `SELECT` order:
/// `code, stationid, brandid, brand, name, address, latitude, longitude`.
///
/// Every non-key column is nullable in the schema, so rows written by other
/// tools may be incomplete.
pub type StationRow = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<f64>,
);

/// Converts a stored row into a [`StationRecord`].
///
/// Returns `None` when a column that a validated station always carries is
/// null. Extra payload fields are not stored, so the record has none.
#[must_use]
pub fn station_from_row(row: StationRow) -> Option<StationRecord> {
    let (code, station_id, brand_id, brand, name, address, latitude, longitude) = row;
    Some(StationRecord {
        station_id,
        brand_id,
        brand: brand?,
        code,
        name: name?,
        address: address?,
        location: Location {
            latitude: latitude?,
            longitude: longitude?,
        },
        extra: Map::new(),
    })
}

/// A stored row from the `price` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrice {
    /// Surrogate key.
    pub price_id: i64,
    /// Referenced station code.
    pub station_code: String,
    /// Fuel type short code.
    pub fuel_type: String,
    /// Latest price written for this key.
    pub price: f64,
    /// Price timestamp.
    pub last_updated: NaiveDateTime,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn full_row() -> StationRow {
        (
            "X1".to_string(),
            None,
            Some("b1".to_string()),
            Some("BP".to_string()),
            Some("BP Ultimo".to_string()),
            Some("1 Harris St".to_string()),
            Some(-33.8),
            Some(151.2),
        )
    }

    #[test]
    fn complete_row_converts() {
        let Some(station) = station_from_row(full_row()) else {
            panic!("complete row should convert");
        };
        assert_eq!(station.code, "X1");
        assert_eq!(station.brand_id.as_deref(), Some("b1"));
        assert!(station.station_id.is_none());
    }

    #[test]
    fn row_with_null_attribute_is_skipped() {
        let mut row = full_row();
        row.6 = None;
        assert!(station_from_row(row).is_none());
    }
}
