//! Pipeline error types with HTTP status code mapping.
//!
//! [`PipelineError`] is the central error type for the service and API
//! layers. Each variant maps to a specific HTTP status code and structured
//! JSON error response. Per-record outcomes (validation rejections, stale
//! prices, join misses) are not errors at this level; they are reported in
//! the ingest outcome.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::PersistenceError;
use crate::service::PipelineState;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid payload: expected a JSON object",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category  | HTTP Status                 |
/// |-----------|-----------|-----------------------------|
/// | 1000–1999 | Transport | 400 Bad Request             |
/// | 2000–2999 | Lifecycle | 503 / 409 Conflict          |
/// | 3000–3999 | Server    | 500 Internal Server Error   |
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The delivered message is not a JSON object.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The pipeline is not in the `Ready` state.
    #[error("pipeline is not accepting records (state: {state})")]
    NotAccepting {
        /// State at the time of the request.
        state: PipelineState,
    },

    /// A lifecycle transition that the state machine does not allow.
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: PipelineState,
        /// Requested state.
        to: PipelineState,
    },

    /// Storage failure outside per-record processing (startup reads).
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidPayload(_) => 1001,
            Self::NotAccepting { .. } => 2001,
            Self::InvalidTransition { .. } => 2002,
            Self::Persistence(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            Self::NotAccepting { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::NotAccepting { state } => Some(format!("state={state}")),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
