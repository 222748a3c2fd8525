//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener and per-request pipeline settings.
    #[serde(rename = "relay")]
    pub listener: ListenerConfig,

    /// Log output settings.
    pub log: LogConfig,

    /// Route definitions mapping listen paths to backends.
    pub routes: Vec<RouteConfig>,

    /// Shared backend HTTP client settings.
    pub transport: TransportConfig,

    /// Periodic throughput reporting.
    pub throughput: ThroughputConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub listen_addr: String,

    /// Upper bound on a single forward, from dispatch to the last body byte.
    pub forward_timeout_secs: u64,

    /// Optional server-wide deadline stamped on every inbound request.
    /// Composed with `forward_timeout_secs`; the tighter one applies.
    pub request_timeout_secs: Option<u64>,

    /// Optional cap on inbound body size. Unbounded when unset.
    pub max_body_bytes: Option<usize>,
}

impl ListenerConfig {
    pub fn forward_timeout(&self) -> Duration {
        Duration::from_secs(self.forward_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            forward_timeout_secs: 15,
            request_timeout_secs: None,
            max_body_bytes: None,
        }
    }
}

/// A single route: listen path, rotation set, and optional method rewrite.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Inbound path this route binds. A trailing `/` binds the whole subtree.
    pub listen_path: String,

    /// Singular backend form, kept for older config files.
    #[serde(default)]
    pub backend_url: Option<String>,

    /// Ordered rotation set.
    #[serde(default)]
    pub backend_urls: Vec<String>,

    /// Method to send upstream instead of the inbound one.
    #[serde(default)]
    pub method_override: Option<String>,
}

impl RouteConfig {
    /// Resolve the rotation set.
    ///
    /// `backend_urls` wins when non-empty; otherwise a non-empty
    /// `backend_url` becomes a one-element set.
    pub fn targets(&self) -> Vec<String> {
        if !self.backend_urls.is_empty() {
            return self.backend_urls.clone();
        }
        match self.backend_url.as_deref() {
            Some(url) if !url.is_empty() => vec![url.to_string()],
            _ => Vec::new(),
        }
    }

    /// The configured override, with empty strings treated as unset.
    pub fn method_override(&self) -> Option<&str> {
        self.method_override
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive (trace, debug, info, warn, error, or full EnvFilter syntax).
    pub level: String,

    /// Write to stdout.
    pub console: bool,

    /// Optional log file. Rotated according to `rotation`.
    pub filepath: Option<String>,

    /// File rotation period.
    pub rotation: LogRotation,

    /// Rotated files to keep. Zero keeps everything.
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            filepath: None,
            rotation: LogRotation::Daily,
            max_files: 7,
        }
    }
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

/// Backend HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Idle connections kept per backend host.
    pub max_idle_per_host: usize,

    /// Idle connections older than this are closed.
    pub idle_timeout_secs: u64,

    /// Per-call ceiling, independent of the forward deadline.
    pub timeout_secs: u64,

    /// Connection establishment timeout.
    pub connect_timeout_secs: u64,

    /// Skip backend certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 100,
            idle_timeout_secs: 90,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            // Backends are usually internal hosts with self-signed certificates.
            accept_invalid_certs: true,
        }
    }
}

/// Throughput sampling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThroughputConfig {
    /// Run the sampler.
    pub enabled: bool,

    /// Sampling period in milliseconds.
    pub interval_ms: u64,

    /// Samples at or below this count are not logged.
    pub report_threshold: u64,
}

impl Default for ThroughputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 1000,
            report_threshold: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
