//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, caller deadline)
//! - Count every request for throughput sampling
//! - Dispatch requests to the route registry, redirecting bare subtree paths
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::client::{BackendTransport, TransportError};
use crate::observability::metrics::ThroughputCounter;
use crate::relay::PipelineSettings;
use crate::resilience::timeouts::Deadline;
use crate::routing::{RouteMatch, RouteRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteRegistry>,
    pub throughput: Arc<ThroughputCounter>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    routes: Arc<RouteRegistry>,
    throughput: Arc<ThroughputCounter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, TransportError> {
        let transport = BackendTransport::new(&config.transport)?;
        let settings = PipelineSettings {
            forward_timeout: config.listener.forward_timeout(),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let routes = Arc::new(RouteRegistry::new(&config.routes, &transport, settings));
        if routes.is_empty() {
            tracing::warn!("No routes configured; every request will get 404");
        }
        let throughput = Arc::new(ThroughputCounter::new());

        let state = AppState {
            routes: routes.clone(),
            throughput: throughput.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            routes,
            throughput,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state);

        if let Some(limit) = config.listener.request_timeout() {
            router = router.layer(middleware::from_fn_with_state(limit, stamp_deadline));
        }

        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// The fully layered router, for driving the server in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Counter fed by every inbound request.
    pub fn throughput(&self) -> Arc<ThroughputCounter> {
        self.throughput.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Count the request and hand it to the pipeline bound to its path.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.throughput.record();

    let path = request.uri().path().to_string();
    match state.routes.resolve(&path) {
        RouteMatch::Pipeline(pipeline) => pipeline.handle(request).await,
        RouteMatch::Redirect(mut location) => {
            if let Some(query) = request.uri().query() {
                location.push('?');
                location.push_str(query);
            }
            tracing::debug!(path = %path, location = %location, "Redirecting to subtree");
            (
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, location)],
                "Moved Permanently",
            )
                .into_response()
        }
        RouteMatch::NotFound => {
            tracing::warn!(path = %path, "No route matched");
            (StatusCode::NOT_FOUND, "404 page not found").into_response()
        }
    }
}

/// Attach the server-wide caller deadline to the request.
async fn stamp_deadline(State(limit): State<Duration>, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(Deadline::after(limit));
    next.run(request).await
}
