//! In-memory station lookup keyed by station code.
//!
//! [`StationDirectory`] is seeded from durable storage at startup and kept
//! current by the station-ingest path. The combiner reads it on every
//! price.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::station::StationRecord;

/// Mapping from station code to the latest validated station.
///
/// # Concurrency
///
/// - Writes (upserts) are serialized behind the write lock.
/// - Lookups take the read lock and clone the entry, so a reader always
///   sees a whole record, never a half-applied upsert.
/// - Critical sections are a single map operation; the lock is a plain
///   `std::sync::RwLock` and is never held across an `.await`.
#[derive(Debug, Default)]
pub struct StationDirectory {
    stations: RwLock<HashMap<String, StationRecord>>,
}

impl StationDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the directory contents with the given stations.
    ///
    /// Later entries win when two share a code.
    pub fn seed(&self, stations: impl IntoIterator<Item = StationRecord>) {
        let seeded: HashMap<String, StationRecord> = stations
            .into_iter()
            .map(|station| (station.code.clone(), station))
            .collect();
        let mut map = self.stations.write().unwrap_or_else(PoisonError::into_inner);
        *map = seeded;
    }

    /// Inserts or replaces the entry for `record.code`.
    ///
    /// Returns `true` if an entry with that code already existed.
    pub fn upsert(&self, record: StationRecord) -> bool {
        let mut map = self.stations.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(record.code.clone(), record).is_some()
    }

    /// Returns a snapshot of the station with the given code.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<StationRecord> {
        let map = self.stations.read().unwrap_or_else(PoisonError::into_inner);
        map.get(code).cloned()
    }

    /// Returns the number of known stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no stations are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
