//! Service layer: the pipeline context object and its lifecycle.
//!
//! [`Pipeline`] owns the station directory, the watermark and the storage
//! backend, and emits cleaned records through the
//! [`super::domain::EventBus`].

pub mod lifecycle;
pub mod outcome;
pub mod pipeline;

pub use lifecycle::{Lifecycle, PipelineState};
pub use outcome::{PriceOutcome, StationOutcome, StorageStatus};
pub use pipeline::{Pipeline, PipelineStats};
