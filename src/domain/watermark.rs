//! Staleness gate for price records.
//!
//! [`Watermark`] holds the `lastupdated` of the most recently admitted
//! price. A record is admitted iff its timestamp is not older than the
//! watermark; admission advances the watermark in the same critical
//! section, so concurrent callers can never move it backwards.

use std::sync::{Mutex, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};

use super::price::PriceRecord;

/// Watermark used when durable storage holds no prices yet.
#[must_use]
pub fn default_watermark() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

/// Monotonic, process-wide price watermark.
///
/// Keeps the full timestamp, so a stored maximum with sub-second precision
/// is not rounded down. The lock is held for a single compare and never
/// across an `.await`.
#[derive(Debug)]
pub struct Watermark {
    current: Mutex<NaiveDateTime>,
}

impl Watermark {
    /// Creates a watermark at the given timestamp.
    #[must_use]
    pub fn new(initial: NaiveDateTime) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    /// Returns the current watermark.
    #[must_use]
    pub fn current(&self) -> NaiveDateTime {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrites the watermark unconditionally. Only for startup, before
    /// any record is admitted.
    pub fn reset(&self, value: NaiveDateTime) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Resets to the storage maximum, or to [`default_watermark`] when
    /// storage holds no prices.
    pub fn seed(&self, stored_max: Option<NaiveDateTime>) {
        self.reset(stored_max.unwrap_or_else(default_watermark));
    }

    /// Admits a price record if it is not stale.
    ///
    /// Returns `true` and advances the watermark when
    /// `record.last_updated >= current`; ties are admitted so exact
    /// redeliveries reach the idempotent upsert instead of being dropped.
    pub fn admit(&self, record: &PriceRecord) -> bool {
        self.admit_at(record.last_updated)
    }

    /// Timestamp form of [`Self::admit`].
    pub fn admit_at(&self, timestamp: NaiveDateTime) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if timestamp < *current {
            return false;
        }
        *current = timestamp;
        true
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::new(default_watermark())
    }
}
