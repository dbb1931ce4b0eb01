//! Persistence layer: durable station and price storage plus the audit log.
//!
//! Provides the [`PersistenceLayer`] trait for idempotent upserts of cleaned
//! records and for the startup reads (watermark, station directory). The
//! PostgreSQL implementation uses `sqlx::PgPool`; the in-memory one backs
//! tests and runs with persistence disabled.

pub mod audit;
pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{PriceRecord, StationRecord};

pub use audit::AuditLog;
pub use memory::MemoryPersistence;
pub use postgres::PostgresPersistence;

/// Storage-layer failure. Fatal to the current record only.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure at startup.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Audit log could not be opened or written.
    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),

    /// A record could not be encoded for the audit log.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result of a price upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceWrite {
    /// The row was inserted, or its price overwritten.
    Written,
    /// The referenced station is not stored; nothing was written.
    StationMissing,
}

impl PriceWrite {
    /// Label used in logs and outcome reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::StationMissing => "station_missing",
        }
    }
}

/// Durable storage for cleaned records.
///
/// Implementations must make both upserts idempotent: repeating a call with
/// identical input leaves exactly the same stored state.
#[async_trait]
pub trait PersistenceLayer: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Returns the maximum stored `lastupdated`, or `None` when no prices
    /// are stored.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] on storage failure.
    async fn load_watermark(&self) -> Result<Option<NaiveDateTime>, PersistenceError>;

    /// Returns every stored station.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] on storage failure.
    async fn load_stations(&self) -> Result<Vec<StationRecord>, PersistenceError>;

    /// Inserts a station or overwrites every non-key attribute of the
    /// station with the same code.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] on storage failure.
    async fn upsert_station(&self, record: &StationRecord) -> Result<(), PersistenceError>;

    /// Writes a price keyed by `(station code, fuel type, lastupdated)`,
    /// overwriting the price on conflict. Skips the write when the station
    /// is not stored.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] on storage failure.
    async fn upsert_price(&self, record: &PriceRecord) -> Result<PriceWrite, PersistenceError>;

    /// Checks that the storage backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when it is not.
    async fn health_check(&self) -> Result<(), PersistenceError>;
}
