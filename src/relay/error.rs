//! Relay failure taxonomy.
//!
//! Every failure is terminal: it is logged once with the request's
//! correlation id and surfaced as a plain-text status. Nothing is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that end a relayed request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The route's rotation set is empty.
    #[error("no backend available")]
    NoBackendAvailable,

    /// The outbound request could not be built (bad method or URL).
    #[error("failed to build backend request: {0}")]
    RequestConstruction(String),

    /// Connection failure, or the deadline passed before response headers arrived.
    #[error("backend request failed: {0}")]
    BackendUnreachable(String),

    /// Response headers arrived but the body could not be read in full.
    #[error("failed to read backend response: {0}")]
    BackendBodyRead(String),

    /// The inbound body exceeded the configured cap.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The inbound body stream failed before it was fully captured.
    #[error("failed to read request body: {0}")]
    InboundBodyRead(String),
}

impl RelayError {
    /// Status code shown to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::NoBackendAvailable => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::RequestConstruction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::BackendUnreachable(_) => StatusCode::BAD_GATEWAY,
            RelayError::BackendBodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::InboundBodyRead(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::NoBackendAvailable => "no_backend_available",
            RelayError::RequestConstruction(_) => "request_construction",
            RelayError::BackendUnreachable(_) => "backend_unreachable",
            RelayError::BackendBodyRead(_) => "backend_body_read",
            RelayError::PayloadTooLarge { .. } => "payload_too_large",
            RelayError::InboundBodyRead(_) => "inbound_body_read",
        }
    }

    /// Caller-facing body. Internal error detail stays in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            RelayError::NoBackendAvailable => "no backend available",
            RelayError::RequestConstruction(_) => "failed to build backend request",
            RelayError::BackendUnreachable(_) => "backend request failed",
            RelayError::BackendBodyRead(_) => "failed to read backend response",
            RelayError::PayloadTooLarge { .. } => "request body too large",
            RelayError::InboundBodyRead(_) => "failed to read request body",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), self.public_message()).into_response()
    }
}
