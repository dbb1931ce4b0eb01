//! Per-record outcome reports returned by the ingest entry points.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ValidationError;
use crate::persistence::PriceWrite;

/// What happened to the durable write for an accepted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageStatus {
    /// The row was inserted or overwritten.
    Written,
    /// The station is in the directory but not in storage, so the price
    /// write was skipped.
    StationMissing,
    /// The storage layer failed; the record was still published.
    Failed,
}

impl From<PriceWrite> for StorageStatus {
    fn from(write: PriceWrite) -> Self {
        match write {
            PriceWrite::Written => Self::Written,
            PriceWrite::StationMissing => Self::StationMissing,
        }
    }
}

/// Result of ingesting one raw station.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StationOutcome {
    /// Validated, stored in the directory and published on `clean.station`.
    Accepted {
        /// Station code.
        code: String,
        /// Whether a station with this code was already known.
        replaced: bool,
        /// Durable write result.
        storage: StorageStatus,
    },
    /// Failed validation; nothing was stored or published.
    Rejected {
        /// Taxonomy label: `type_error`, `out_of_range`, `bad_timestamp`
        /// or `null_field`.
        reason: String,
        /// Human-readable description.
        detail: String,
    },
}

impl StationOutcome {
    /// Outcome for a station that failed validation.
    #[must_use]
    pub fn rejected(err: &ValidationError) -> Self {
        Self::Rejected {
            reason: err.reason().to_string(),
            detail: err.to_string(),
        }
    }
}

/// Result of ingesting one raw price.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PriceOutcome {
    /// Published on `clean.price` and, joined with its station, on
    /// `clean.combined`.
    Combined {
        /// Durable write result.
        storage: StorageStatus,
    },
    /// No station with this code is in the directory; the price was
    /// dropped without being stored or published.
    JoinMissed {
        /// The station code that found no match.
        stationcode: String,
    },
    /// Older than the watermark; dropped.
    Stale {
        /// Watermark at the time of the check (`dd/mm/YYYY HH:MM:SS`).
        watermark: String,
    },
    /// Failed validation; nothing was stored or published.
    Rejected {
        /// Taxonomy label.
        reason: String,
        /// Human-readable description.
        detail: String,
    },
}

impl PriceOutcome {
    /// Outcome for a price that failed validation.
    #[must_use]
    pub fn rejected(err: &ValidationError) -> Self {
        Self::Rejected {
            reason: err.reason().to_string(),
            detail: err.to_string(),
        }
    }
}
