//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::Pipeline;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The pipeline every ingest request is routed into.
    pub pipeline: Arc<Pipeline>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds the state around a pipeline, sharing its event bus.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let event_bus = pipeline.event_bus().clone();
        Self {
            pipeline,
            event_bus,
        }
    }
}
