//! The pipeline context: validate, gate, combine, persist, publish.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use utoipa::ToSchema;

use super::lifecycle::{Lifecycle, PipelineState};
use super::outcome::{PriceOutcome, StationOutcome, StorageStatus};
use crate::domain::price::LAST_UPDATED_FORMAT;
use crate::domain::{
    CleanEvent, CombinedRecord, Combiner, EventBus, PriceRecord, RawPrice, RawStation,
    StationDirectory, Watermark, validate_price, validate_station,
};
use crate::error::PipelineError;
use crate::persistence::{AuditLog, PersistenceLayer, PriceWrite};

#[derive(Debug, Default)]
struct Counters {
    stations_accepted: AtomicU64,
    stations_rejected: AtomicU64,
    prices_combined: AtomicU64,
    prices_join_missed: AtomicU64,
    prices_stale: AtomicU64,
    prices_rejected: AtomicU64,
    storage_failures: AtomicU64,
    audit_failures: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Snapshot of the per-outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PipelineStats {
    /// Stations validated and published.
    pub stations_accepted: u64,
    /// Stations rejected by validation.
    pub stations_rejected: u64,
    /// Prices published on both `clean.price` and `clean.combined`.
    pub prices_combined: u64,
    /// Prices dropped because their station is not in the directory.
    pub prices_join_missed: u64,
    /// Prices dropped by the watermark.
    pub prices_stale: u64,
    /// Prices rejected by validation.
    pub prices_rejected: u64,
    /// Failed durable writes.
    pub storage_failures: u64,
    /// Failed audit log appends.
    pub audit_failures: u64,
}

/// Owns all pipeline state and exposes the typed ingest entry points.
///
/// Both entry points are safe to call concurrently. Records are admitted
/// only while the pipeline is [`PipelineState::Ready`]; [`Pipeline::drain`]
/// waits for every admitted record to finish.
#[derive(Debug)]
pub struct Pipeline {
    directory: Arc<StationDirectory>,
    watermark: Watermark,
    combiner: Combiner,
    persistence: Arc<dyn PersistenceLayer>,
    audit: Option<AuditLog>,
    event_bus: EventBus,
    lifecycle: Lifecycle,
    in_flight: RwLock<()>,
    // directory and storage see station updates in the same order
    station_writes: Mutex<()>,
    counters: Counters,
}

impl Pipeline {
    /// Creates a pipeline in [`PipelineState::Starting`].
    #[must_use]
    pub fn new(
        persistence: Arc<dyn PersistenceLayer>,
        audit: Option<AuditLog>,
        event_bus: EventBus,
    ) -> Self {
        let directory = Arc::new(StationDirectory::new());
        Self {
            combiner: Combiner::new(Arc::clone(&directory)),
            directory,
            watermark: Watermark::default(),
            persistence,
            audit,
            event_bus,
            lifecycle: Lifecycle::new(),
            in_flight: RwLock::new(()),
            station_writes: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the station directory.
    #[must_use]
    pub fn directory(&self) -> &Arc<StationDirectory> {
        &self.directory
    }

    /// Returns the staleness watermark.
    #[must_use]
    pub fn watermark(&self) -> &Watermark {
        &self.watermark
    }

    /// Returns the storage backend.
    #[must_use]
    pub fn persistence(&self) -> &Arc<dyn PersistenceLayer> {
        &self.persistence
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.lifecycle.current()
    }

    /// Snapshot of the outcome counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        let c = &self.counters;
        PipelineStats {
            stations_accepted: c.stations_accepted.load(Ordering::Relaxed),
            stations_rejected: c.stations_rejected.load(Ordering::Relaxed),
            prices_combined: c.prices_combined.load(Ordering::Relaxed),
            prices_join_missed: c.prices_join_missed.load(Ordering::Relaxed),
            prices_stale: c.prices_stale.load(Ordering::Relaxed),
            prices_rejected: c.prices_rejected.load(Ordering::Relaxed),
            storage_failures: c.storage_failures.load(Ordering::Relaxed),
            audit_failures: c.audit_failures.load(Ordering::Relaxed),
        }
    }

    /// Loads the watermark and the station directory from storage, then
    /// moves to [`PipelineState::Ready`].
    ///
    /// On a storage failure the pipeline moves to
    /// [`PipelineState::Stopped`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] if called outside
    /// `Starting`, or [`PipelineError::Persistence`] if a startup read fails.
    pub async fn start(&self) -> Result<(), PipelineError> {
        let state = self.lifecycle.current();
        if state != PipelineState::Starting {
            return Err(PipelineError::InvalidTransition {
                from: state,
                to: PipelineState::Ready,
            });
        }

        if let Err(e) = self.load_startup_state().await {
            tracing::error!(error = %e, "pipeline startup failed");
            let _ = self.lifecycle.transition(PipelineState::Stopped);
            return Err(e);
        }

        self.lifecycle.transition(PipelineState::Ready)?;
        tracing::info!("pipeline ready");
        Ok(())
    }

    async fn load_startup_state(&self) -> Result<(), PipelineError> {
        let stored = self.persistence.load_watermark().await?;
        self.watermark.seed(stored);

        let stations = self.persistence.load_stations().await?;
        let loaded = stations.len();
        self.directory.seed(stations);

        tracing::info!(
            backend = self.persistence.backend(),
            watermark = %self.watermark.current().format(LAST_UPDATED_FORMAT),
            stations = loaded,
            "pipeline state loaded"
        );
        Ok(())
    }

    /// Refuses new records, waits for in-flight ones, then stops.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] unless the pipeline is
    /// `Ready`.
    pub async fn drain(&self) -> Result<(), PipelineError> {
        self.lifecycle.transition(PipelineState::Draining)?;
        tracing::info!("pipeline draining");

        let quiesced = self.in_flight.write().await;
        self.lifecycle.transition(PipelineState::Stopped)?;
        drop(quiesced);

        tracing::info!(stats = ?self.stats(), "pipeline stopped");
        Ok(())
    }

    /// Holds off [`Self::drain`] until the returned guard is dropped.
    async fn enter(&self) -> Result<RwLockReadGuard<'_, ()>, PipelineError> {
        let state = self.lifecycle.current();
        if state != PipelineState::Ready {
            return Err(PipelineError::NotAccepting { state });
        }
        let guard = self.in_flight.read().await;
        // drain may have started while we waited
        let state = self.lifecycle.current();
        if state != PipelineState::Ready {
            return Err(PipelineError::NotAccepting { state });
        }
        Ok(guard)
    }

    /// Processes one raw station message.
    ///
    /// A valid station replaces any directory entry with the same code, is
    /// written to storage and published on `clean.station`. Station writes
    /// are serialized so the directory and storage agree on the last
    /// update. A storage failure is logged and does not prevent publishing.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotAccepting`] unless the pipeline is
    /// `Ready`. Validation rejections are outcomes, not errors.
    pub async fn ingest_station(&self, raw: RawStation) -> Result<StationOutcome, PipelineError> {
        let _in_flight = self.enter().await?;

        let record = match validate_station(&raw) {
            Ok(record) => record,
            Err(e) => {
                bump(&self.counters.stations_rejected);
                tracing::warn!(reason = e.reason(), code = ?raw.code, error = %e, "station rejected");
                return Ok(StationOutcome::rejected(&e));
            }
        };

        let (replaced, storage) = {
            let _ordered = self.station_writes.lock().await;
            let replaced = self.directory.upsert(record.clone());
            let storage = match self.persistence.upsert_station(&record).await {
                Ok(()) => StorageStatus::Written,
                Err(e) => {
                    bump(&self.counters.storage_failures);
                    tracing::error!(code = %record.code, error = %e, "failed to persist station");
                    StorageStatus::Failed
                }
            };
            (replaced, storage)
        };

        let code = record.code.clone();
        self.event_bus.publish(CleanEvent::Station(record));
        bump(&self.counters.stations_accepted);
        tracing::debug!(%code, replaced, "station accepted");

        Ok(StationOutcome::Accepted {
            code,
            replaced,
            storage,
        })
    }

    /// Processes one raw price message.
    ///
    /// A valid price older than the watermark is dropped, as is one whose
    /// station is not in the directory. Otherwise it is written to storage,
    /// published on `clean.price`, then merged with its station and
    /// published on `clean.combined`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotAccepting`] unless the pipeline is
    /// `Ready`. Rejections, staleness and join misses are outcomes.
    pub async fn ingest_price(&self, raw: RawPrice) -> Result<PriceOutcome, PipelineError> {
        let _in_flight = self.enter().await?;

        let record = match validate_price(&raw) {
            Ok(record) => record,
            Err(e) => {
                bump(&self.counters.prices_rejected);
                tracing::warn!(
                    reason = e.reason(),
                    stationcode = ?raw.stationcode,
                    fueltype = ?raw.fueltype,
                    lastupdated = ?raw.lastupdated,
                    error = %e,
                    "price rejected"
                );
                return Ok(PriceOutcome::rejected(&e));
            }
        };

        if !self.watermark.admit(&record) {
            bump(&self.counters.prices_stale);
            let watermark = self.watermark.current().format(LAST_UPDATED_FORMAT).to_string();
            tracing::debug!(
                stationcode = %record.station_code,
                lastupdated = %record.last_updated.format(LAST_UPDATED_FORMAT),
                %watermark,
                "stale price dropped"
            );
            return Ok(PriceOutcome::Stale { watermark });
        }

        let combined = match self.combiner.combine(&record) {
            Ok(combined) => combined,
            Err(miss) => {
                bump(&self.counters.prices_join_missed);
                tracing::info!(
                    stationcode = %miss.station_code,
                    fueltype = %record.fuel_type,
                    "no station for price, price dropped"
                );
                return Ok(PriceOutcome::JoinMissed {
                    stationcode: miss.station_code,
                });
            }
        };

        let storage = self.persist_price(&record).await;
        self.event_bus.publish(CleanEvent::Price(record));
        self.append_audit(&combined).await;
        self.event_bus.publish(CleanEvent::Combined(combined));
        bump(&self.counters.prices_combined);
        Ok(PriceOutcome::Combined { storage })
    }

    async fn persist_price(&self, record: &PriceRecord) -> StorageStatus {
        match self.persistence.upsert_price(record).await {
            Ok(write) => {
                if write == PriceWrite::StationMissing {
                    tracing::warn!(
                        stationcode = %record.station_code,
                        fueltype = %record.fuel_type,
                        write = write.as_str(),
                        "station not stored, price not stored"
                    );
                }
                StorageStatus::from(write)
            }
            Err(e) => {
                bump(&self.counters.storage_failures);
                tracing::error!(
                    stationcode = %record.station_code,
                    fueltype = %record.fuel_type,
                    error = %e,
                    "failed to persist price"
                );
                StorageStatus::Failed
            }
        }
    }

    async fn append_audit(&self, record: &CombinedRecord) {
        let Some(audit) = &self.audit else {
            return;
        };
        if let Err(e) = audit.append(record).await {
            bump(&self.counters.audit_failures);
            tracing::error!(
                path = %audit.path().display(),
                code = %record.code,
                error = %e,
                "failed to append combined record to audit log"
            );
        }
    }
}
