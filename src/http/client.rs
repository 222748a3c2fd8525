//! Shared backend HTTP client.
//!
//! # Responsibilities
//! - Own the single connection pool used for every route
//! - Convert a built outbound request into a backend call
//! - Classify failures: unreachable (no response head) vs body read
//!
//! # Design Decisions
//! - One `reqwest::Client`; clones share its pool
//! - Backend certificates are not verified when `accept_invalid_certs` is
//!   set, so TLS to backends gives privacy but no authenticity
//! - The client's own timeout is a ceiling; the per-request `Deadline`
//!   usually fires first
//! - The response body is read in full before anything reaches the caller

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Request, StatusCode};
use thiserror::Error;

use crate::config::TransportConfig;
use crate::relay::diagnostics;
use crate::relay::error::RelayError;
use crate::resilience::timeouts::Deadline;

/// Failure to set up the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build backend client: {0}")]
    Build(#[from] reqwest::Error),
}

/// A fully read backend response.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BackendResponse {
    pub fn dump(&self) -> String {
        diagnostics::dump_response(self.status, &self.headers)
    }
}

/// Result of handing one request to a backend.
pub type ForwardOutcome = Result<BackendResponse, RelayError>;

/// Connection-pooled client for all outbound calls.
#[derive(Debug, Clone)]
pub struct BackendTransport {
    client: reqwest::Client,
}

impl BackendTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        if config.accept_invalid_certs {
            tracing::warn!("Backend TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .no_proxy()
            .build()?;

        Ok(Self { client })
    }

    /// Send `request` and read the whole response before `deadline`.
    pub async fn execute(&self, request: Request<Bytes>, deadline: Deadline) -> ForwardOutcome {
        let request = reqwest::Request::try_from(request)
            .map_err(|e| RelayError::RequestConstruction(e.to_string()))?;

        if deadline.is_expired() {
            return Err(RelayError::BackendUnreachable(
                "deadline passed before dispatch".to_string(),
            ));
        }
        tracing::debug!(
            budget_ms = deadline.remaining().as_millis() as u64,
            "Dispatching to backend"
        );

        let response = match deadline.run(self.client.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(RelayError::BackendUnreachable(e.to_string())),
            Err(_) => {
                return Err(RelayError::BackendUnreachable(
                    "no response before deadline".to_string(),
                ))
            }
        };

        let status = response.status();
        let headers = response.headers().clone();

        let body = match deadline.run(response.bytes()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return Err(RelayError::BackendBodyRead(e.to_string())),
            Err(_) => {
                return Err(RelayError::BackendBodyRead(
                    "body incomplete at deadline".to_string(),
                ))
            }
        };

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }
}
