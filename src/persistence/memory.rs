//! In-process implementation of the persistence layer.
//!
//! Mirrors the PostgreSQL contract (primary key on station code, unique
//! price key, station-existence check) over two maps. Used when
//! persistence is disabled and throughout the tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::models::StoredPrice;
use super::{PersistenceError, PersistenceLayer, PriceWrite};
use crate::domain::{PriceRecord, StationRecord};

type PriceKey = (String, String, NaiveDateTime);

#[derive(Debug, Default)]
struct Tables {
    stations: HashMap<String, StationRecord>,
    prices: HashMap<PriceKey, StoredPrice>,
    next_price_id: i64,
}

/// Map-backed persistence with the same upsert semantics as PostgreSQL.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    tables: Mutex<Tables>,
}

impl MemoryPersistence {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tables)
    }

    /// Returns the stored station with the given code.
    #[must_use]
    pub fn station(&self, code: &str) -> Option<StationRecord> {
        self.with_tables(|t| t.stations.get(code).cloned())
    }

    /// Returns the stored price row for one key.
    #[must_use]
    pub fn price(
        &self,
        station_code: &str,
        fuel_type: &str,
        last_updated: NaiveDateTime,
    ) -> Option<StoredPrice> {
        let key = (station_code.to_string(), fuel_type.to_string(), last_updated);
        self.with_tables(|t| t.prices.get(&key).cloned())
    }

    /// Number of stored station rows.
    #[must_use]
    pub fn station_count(&self) -> usize {
        self.with_tables(|t| t.stations.len())
    }

    /// Number of stored price rows.
    #[must_use]
    pub fn price_count(&self) -> usize {
        self.with_tables(|t| t.prices.len())
    }
}

#[async_trait]
impl PersistenceLayer for MemoryPersistence {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn load_watermark(&self) -> Result<Option<NaiveDateTime>, PersistenceError> {
        Ok(self.with_tables(|t| t.prices.values().map(|p| p.last_updated).max()))
    }

    async fn load_stations(&self) -> Result<Vec<StationRecord>, PersistenceError> {
        Ok(self.with_tables(|t| t.stations.values().cloned().collect()))
    }

    async fn upsert_station(&self, record: &StationRecord) -> Result<(), PersistenceError> {
        self.with_tables(|t| {
            t.stations.insert(record.code.clone(), record.clone());
        });
        Ok(())
    }

    async fn upsert_price(&self, record: &PriceRecord) -> Result<PriceWrite, PersistenceError> {
        Ok(self.with_tables(|t| {
            if !t.stations.contains_key(&record.station_code) {
                return PriceWrite::StationMissing;
            }
            let key = (
                record.station_code.clone(),
                record.fuel_type.clone(),
                record.last_updated,
            );
            if let Some(existing) = t.prices.get_mut(&key) {
                existing.price = record.price;
            } else {
                t.next_price_id = t.next_price_id.saturating_add(1);
                let row = StoredPrice {
                    price_id: t.next_price_id,
                    station_code: record.station_code.clone(),
                    fuel_type: record.fuel_type.clone(),
                    price: record.price,
                    last_updated: record.last_updated,
                };
                t.prices.insert(key, row);
            }
            PriceWrite::Written
        }))
    }

    async fn health_check(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}
