//! Price records joined with their station.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::price::{PriceRecord, last_updated_format};
use super::station::StationRecord;

/// Flat union of a [`PriceRecord`] and its [`StationRecord`].
///
/// The price's `stationcode` is not carried: the station's own `code`
/// already identifies it. Extra payload fields of either side are not
/// merged. Published on `clean.combined` and written to the audit log;
/// never stored as a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    /// Fuel type short code.
    #[serde(rename = "fueltype")]
    pub fuel_type: String,
    /// Price value.
    pub price: f64,
    /// Price timestamp.
    #[serde(rename = "lastupdated", with = "last_updated_format")]
    pub last_updated: NaiveDateTime,
    /// Station code.
    pub code: String,
    /// Upstream station identifier.
    #[serde(rename = "stationid")]
    pub station_id: Option<String>,
    /// Upstream brand identifier.
    #[serde(rename = "brandid")]
    pub brand_id: Option<String>,
    /// Brand name.
    pub brand: String,
    /// Station display name.
    pub name: String,
    /// Station address.
    pub address: String,
    /// Station latitude.
    pub latitude: f64,
    /// Station longitude.
    pub longitude: f64,
}

impl CombinedRecord {
    /// Merges a price with the station it references.
    #[must_use]
    pub fn merge(price: &PriceRecord, station: &StationRecord) -> Self {
        Self {
            fuel_type: price.fuel_type.clone(),
            price: price.price,
            last_updated: price.last_updated,
            code: station.code.clone(),
            station_id: station.station_id.clone(),
            brand_id: station.brand_id.clone(),
            brand: station.brand.clone(),
            name: station.name.clone(),
            address: station.address.clone(),
            latitude: station.latitude(),
            longitude: station.longitude(),
        }
    }
}
