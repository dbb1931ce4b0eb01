//! Joins price records with station metadata.

use std::sync::Arc;

use super::combined::CombinedRecord;
use super::price::PriceRecord;
use super::station_directory::StationDirectory;

/// A price whose station is not in the directory at combine time.
///
/// Unmatched prices are dropped, not buffered: the station was either
/// announced out of order or never announced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no station with code {station_code}")]
pub struct JoinMiss {
    /// The code that was looked up.
    pub station_code: String,
}

/// Keyed join of prices against the [`StationDirectory`].
#[derive(Debug, Clone)]
pub struct Combiner {
    directory: Arc<StationDirectory>,
}

impl Combiner {
    /// Creates a combiner reading from the given directory.
    #[must_use]
    pub fn new(directory: Arc<StationDirectory>) -> Self {
        Self { directory }
    }

    /// Merges `price` with its station.
    ///
    /// # Errors
    ///
    /// Returns [`JoinMiss`] when no station has code `price.station_code`.
    pub fn combine(&self, price: &PriceRecord) -> Result<CombinedRecord, JoinMiss> {
        let station = self
            .directory
            .lookup(&price.station_code)
            .ok_or_else(|| JoinMiss {
                station_code: price.station_code.clone(),
            })?;
        Ok(CombinedRecord::merge(price, &station))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::price::parse_last_updated;
    use crate::domain::station::{Location, StationRecord};

    fn station(code: &str) -> StationRecord {
        StationRecord {
            station_id: Some("sid-1".to_string()),
            brand_id: Some("bid-1".to_string()),
            brand: "7-Eleven".to_string(),
            code: code.to_string(),
            name: "7-Eleven Surry Hills".to_string(),
            address: "3 Crown St".to_string(),
            location: Location {
                latitude: -33.8,
                longitude: 151.2,
            },
            extra: Default::default(),
        }
    }

    fn price(code: &str) -> PriceRecord {
        let Ok(last_updated) = parse_last_updated("01/01/2024 10:00:00") else {
            panic!("valid timestamp");
        };
        PriceRecord {
            station_code: code.to_string(),
            fuel_type: "E10".to_string(),
            price: 180.5,
            last_updated,
            extra: Default::default(),
        }
    }

    #[test]
    fn match_merges_every_attribute() {
        let directory = Arc::new(StationDirectory::new());
        let _ = directory.upsert(station("X1"));
        let combiner = Combiner::new(directory);

        let Ok(combined) = combiner.combine(&price("X1")) else {
            panic!("price should combine");
        };
        assert_eq!(combined.code, "X1");
        assert_eq!(combined.fuel_type, "E10");
        assert_eq!(combined.brand, "7-Eleven");
        assert_eq!(combined.station_id.as_deref(), Some("sid-1"));
        assert_eq!(combined.brand_id.as_deref(), Some("bid-1"));
        assert!((combined.price - 180.5).abs() < f64::EPSILON);
        assert!((combined.latitude - -33.8).abs() < f64::EPSILON);
    }

    #[test]
    fn combined_payload_drops_join_key() {
        let directory = Arc::new(StationDirectory::new());
        let _ = directory.upsert(station("X1"));
        let combiner = Combiner::new(directory);

        let Ok(combined) = combiner.combine(&price("X1")) else {
            panic!("price should combine");
        };
        let Ok(value) = serde_json::to_value(&combined) else {
            panic!("serialization failed");
        };
        let Some(object) = value.as_object() else {
            panic!("combined record should serialize to an object");
        };
        assert!(!object.contains_key("stationcode"));
        for key in [
            "fueltype",
            "price",
            "lastupdated",
            "code",
            "stationid",
            "brandid",
            "brand",
            "name",
            "address",
            "latitude",
            "longitude",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn unknown_station_is_join_miss() {
        let directory = Arc::new(StationDirectory::new());
        let _ = directory.upsert(station("X1"));
        let combiner = Combiner::new(directory);

        let result = combiner.combine(&price("X2"));
        assert_eq!(
            result.err(),
            Some(JoinMiss {
                station_code: "X2".to_string()
            })
        );
    }

    #[test]
    fn sees_stations_added_after_construction() {
        let directory = Arc::new(StationDirectory::new());
        let combiner = Combiner::new(Arc::clone(&directory));
        assert!(combiner.combine(&price("X1")).is_err());

        let _ = directory.upsert(station("X1"));
        assert!(combiner.combine(&price("X1")).is_ok());
    }
}
