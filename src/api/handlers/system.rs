//! System endpoints: health check and pipeline status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::PipelineStatusResponse;
use crate::app_state::AppState;
use crate::domain::price::LAST_UPDATED_FORMAT;
use crate::service::PipelineState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    state: PipelineState,
    storage: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, lifecycle state, storage reachability, version, and current timestamp. Reports `degraded` when the storage health check fails.",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let persistence = state.pipeline.persistence();
    let (status, storage) = match persistence.health_check().await {
        Ok(()) => ("healthy", "ok"),
        Err(e) => {
            tracing::warn!(backend = persistence.backend(), error = %e, "storage health check failed");
            ("degraded", "unreachable")
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: status.to_string(),
            state: state.pipeline.state(),
            storage: storage.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /pipeline/status`: Lifecycle state, watermark and counters.
#[utoipa::path(
    get,
    path = "/api/v1/pipeline/status",
    tag = "System",
    summary = "Pipeline status",
    description = "Returns the lifecycle state, current watermark, station directory size and per-outcome counters.",
    responses(
        (status = 200, description = "Pipeline status", body = PipelineStatusResponse),
    )
)]
pub async fn pipeline_status(State(state): State<AppState>) -> impl IntoResponse {
    let pipeline = &state.pipeline;
    Json(PipelineStatusResponse {
        state: pipeline.state(),
        watermark: pipeline
            .watermark()
            .current()
            .format(LAST_UPDATED_FORMAT)
            .to_string(),
        stations: pipeline.directory().len(),
        storage_backend: pipeline.persistence().backend().to_string(),
        subscribers: state.event_bus.receiver_count(),
        stats: pipeline.stats(),
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

/// Status route, nested under `/api/v1`.
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/pipeline/status", get(pipeline_status))
}
