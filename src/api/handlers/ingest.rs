//! Raw-topic ingest handlers: one JSON object per request.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app_state::AppState;
use crate::domain::{RawPrice, RawStation};
use crate::error::{ErrorResponse, PipelineError};
use crate::service::{PriceOutcome, StationOutcome};

/// Decodes a delivery into a raw message. Anything but a JSON object is a
/// transport error, not a validation rejection.
fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, PipelineError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PipelineError::InvalidPayload(format!("malformed JSON: {e}")))?;
    if !value.is_object() {
        return Err(PipelineError::InvalidPayload(
            "expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| PipelineError::InvalidPayload(e.to_string()))
}

/// `POST /topics/raw.station`: Deliver one raw station message.
///
/// # Errors
///
/// Returns [`PipelineError`] if the body is not a JSON object or the
/// pipeline is not accepting records.
#[utoipa::path(
    post,
    path = "/api/v1/topics/raw.station",
    tag = "Ingest",
    summary = "Deliver a raw station",
    description = "Validates the station, replaces any directory entry with the same code, persists it and publishes it on `clean.station`. Validation rejections are accepted deliveries reported in the body.",
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 202, description = "Delivery processed", body = StationOutcome),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 503, description = "Pipeline not ready", body = ErrorResponse),
    )
)]
pub async fn ingest_raw_station(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PipelineError> {
    let raw: RawStation = decode_object(&body)?;
    let outcome = state.pipeline.ingest_station(raw).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}

/// `POST /topics/raw.price`: Deliver one raw price message.
///
/// # Errors
///
/// Returns [`PipelineError`] if the body is not a JSON object or the
/// pipeline is not accepting records.
#[utoipa::path(
    post,
    path = "/api/v1/topics/raw.price",
    tag = "Ingest",
    summary = "Deliver a raw price",
    description = "Validates the price and applies the watermark. An admitted price whose station is known is persisted, published on `clean.price`, merged with its station and published on `clean.combined`. A price for an unknown station is dropped.",
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 202, description = "Delivery processed", body = PriceOutcome),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 503, description = "Pipeline not ready", body = ErrorResponse),
    )
)]
pub async fn ingest_raw_price(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PipelineError> {
    let raw: RawPrice = decode_object(&body)?;
    let outcome = state.pipeline.ingest_price(raw).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}

/// Ingest routes for the two raw topics.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/topics/raw.station", post(ingest_raw_station))
        .route("/topics/raw.price", post(ingest_raw_price))
}
