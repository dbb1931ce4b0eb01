//! REST API layer: route handlers, DTOs, router composition and the
//! OpenAPI document.
//!
//! Ingest and status endpoints are mounted under `/api/v1`; `/health` and
//! the documentation routes live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI description of every HTTP endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "fuel-pipeline",
        description = "Clean, combine and persist fuel station and price telemetry."
    ),
    paths(
        handlers::ingest::ingest_raw_station,
        handlers::ingest::ingest_raw_price,
        handlers::system::health_handler,
        handlers::system::pipeline_status,
    ),
    components(schemas(
        crate::service::StationOutcome,
        crate::service::PriceOutcome,
        crate::service::StorageStatus,
        crate::service::PipelineState,
        crate::service::PipelineStats,
        dto::PipelineStatusResponse,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Ingest", description = "Raw topic deliveries"),
        (name = "System", description = "Health and pipeline status"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, docs and middleware.
pub fn build_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
