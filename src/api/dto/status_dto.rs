//! Pipeline status DTO.

use serde::Serialize;
use utoipa::ToSchema;

use crate::service::{PipelineState, PipelineStats};

/// Response body for `GET /api/v1/pipeline/status`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PipelineStatusResponse {
    /// Lifecycle state.
    pub state: PipelineState,
    /// Current watermark (`dd/mm/YYYY HH:MM:SS`).
    pub watermark: String,
    /// Number of stations in the directory.
    pub stations: usize,
    /// Storage backend name (`postgres` or `memory`).
    pub storage_backend: String,
    /// Live event bus subscribers.
    pub subscribers: usize,
    /// Per-outcome counters since startup.
    pub stats: PipelineStats,
}
