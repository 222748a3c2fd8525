//! Per-route request pipeline.
//!
//! # Responsibilities
//! - Answer CORS preflight locally
//! - Capture the inbound body once and share it with the audit log and the forwarder
//! - Resolve the outbound method and pick a backend in round-robin order
//! - Build the outbound request, forward it under a deadline, relay the result
//!
//! # Design Decisions
//! - One pipeline per route, owning that route's rotator and override
//! - Steps run strictly in order; any failure is terminal and reported once
//! - Nothing is committed to the caller until the backend response is fully read
//! - Every log line of a request carries its correlation id via the span

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request};
use axum::response::{IntoResponse, Response};
use tracing::Instrument;

use crate::config::RouteConfig;
use crate::http::client::{BackendTransport, ForwardOutcome};
use crate::http::request::CorrelationId;
use crate::http::response;
use crate::load_balancer::RoundRobin;
use crate::observability::metrics;
use crate::relay::diagnostics;
use crate::relay::error::RelayError;
use crate::relay::snapshot::RequestSnapshot;
use crate::relay::target::{build_target_url, method_rewrite};
use crate::resilience::timeouts::Deadline;

/// Limits shared by every pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Ceiling on one forward, from dispatch to the last response byte.
    pub forward_timeout: Duration,
    /// Inbound body cap. `None` captures bodies of any size.
    pub max_body_bytes: Option<usize>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            forward_timeout: Duration::from_secs(15),
            max_body_bytes: None,
        }
    }
}

/// Request handling for one route.
#[derive(Debug)]
pub struct RelayPipeline {
    listen_path: String,
    rotator: RoundRobin,
    method_override: Option<String>,
    transport: BackendTransport,
    settings: PipelineSettings,
}

impl RelayPipeline {
    pub fn new(route: &RouteConfig, transport: BackendTransport, settings: PipelineSettings) -> Self {
        Self {
            listen_path: route.listen_path.clone(),
            rotator: RoundRobin::new(route.targets()),
            method_override: route.method_override().map(str::to_string),
            transport,
            settings,
        }
    }

    pub fn listen_path(&self) -> &str {
        &self.listen_path
    }

    pub fn targets(&self) -> &[String] {
        self.rotator.targets()
    }

    pub fn method_override(&self) -> Option<&str> {
        self.method_override.as_deref()
    }

    /// Handle one inbound request end to end.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let id = CorrelationId::next();
        let span = tracing::info_span!("relay", request_id = %id, route = %self.listen_path);
        self.handle_inner(request).instrument(span).await
    }

    async fn handle_inner(&self, request: Request<Body>) -> Response {
        let start = Instant::now();

        if request.method() == Method::OPTIONS {
            tracing::debug!("Answering CORS preflight");
            metrics::record_request(&self.listen_path, 200, start);
            return response::preflight();
        }

        let response = match self.forward(request).await {
            Ok(backend) => {
                tracing::info!("Backend response:\n{}", backend.dump());
                response::relay(backend)
            }
            Err(err) => {
                tracing::error!(kind = err.kind(), error = %err, "Relay failed");
                err.into_response()
            }
        };

        metrics::record_request(&self.listen_path, response.status().as_u16(), start);
        response::allow_any_origin(response)
    }

    async fn forward(&self, request: Request<Body>) -> ForwardOutcome {
        let inherited = request.extensions().get::<Deadline>().copied();

        let snapshot = RequestSnapshot::capture(request, self.settings.max_body_bytes).await?;
        tracing::info!("Inbound request:\n{}", snapshot.dump());

        let method = match method_rewrite(snapshot.method(), self.method_override.as_deref()) {
            Some(rewritten) => {
                tracing::info!(from = %snapshot.method(), to = %rewritten, "Method rewritten");
                rewritten
            }
            None => snapshot.method().to_string(),
        };

        let backend = self.rotator.next().ok_or(RelayError::NoBackendAvailable)?;
        let target = build_target_url(backend, snapshot.uri());

        let deadline = Deadline::derive(self.settings.forward_timeout, inherited);
        let outbound = build_outbound(&method, &target, &snapshot)?;
        tracing::info!(
            url = %target,
            "Forwarding request:\n{}",
            diagnostics::dump_request(
                outbound.method(),
                outbound.uri(),
                outbound.version(),
                outbound.headers(),
                outbound.body(),
            )
        );

        self.transport.execute(outbound, deadline).await
    }
}

/// Build the outbound request from the captured inbound one.
///
/// Headers are copied minus connection framing. The body is a view of the
/// captured buffer, the same bytes the inbound dump renders.
fn build_outbound(
    method: &str,
    target: &str,
    snapshot: &RequestSnapshot,
) -> Result<Request<Bytes>, RelayError> {
    let mut outbound = Request::builder()
        .method(method)
        .uri(target)
        .body(snapshot.body().clone())
        .map_err(|e| RelayError::RequestConstruction(e.to_string()))?;

    let mut headers = snapshot.headers().clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);
    *outbound.headers_mut() = headers;

    Ok(outbound)
}
