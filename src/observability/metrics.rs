//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Count requests per sampling window and report throughput
//! - Define relay metrics (requests, latency, throughput)
//! - Optionally expose a Prometheus-compatible endpoint
//!
//! # Metrics
//! - `relay_requests_total` (counter): completed requests by route, status
//! - `relay_request_duration_seconds` (histogram): latency by route
//! - `relay_requests_per_second` (gauge): last throughput sample
//!
//! # Design Decisions
//! - Throughput is one atomic counter: fetch-add per request, swap-to-zero
//!   per window, so every increment lands in exactly one window
//! - Metric updates go through the `metrics` facade and are no-ops until an
//!   exporter is installed

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::ThroughputConfig;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Requests seen since the last drain.
#[derive(Debug, Default)]
pub struct ThroughputCounter {
    count: AtomicU64,
}

impl ThroughputCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request.
    pub fn record(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the current count and reset it to zero.
    pub fn drain(&self) -> u64 {
        self.count.swap(0, Ordering::AcqRel)
    }
}

/// Periodically drains a [`ThroughputCounter`] and reports the sample.
pub struct ThroughputSampler {
    counter: Arc<ThroughputCounter>,
    interval: Duration,
    report_threshold: u64,
}

impl ThroughputSampler {
    pub fn new(counter: Arc<ThroughputCounter>, config: &ThroughputConfig) -> Self {
        Self {
            counter,
            interval: Duration::from_millis(config.interval_ms),
            report_threshold: config.report_threshold,
        }
    }

    /// Sample until shutdown is signalled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sample();
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Throughput sampler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Drain one window. Returns the sampled count.
    pub fn sample(&self) -> u64 {
        let count = self.counter.drain();
        metrics::gauge!("relay_requests_per_second").set(count as f64);
        if count > self.report_threshold {
            tracing::info!(qps = count, "Requests in the last window");
        }
        count
    }
}
