//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, console and rotating file)
//!     → metrics.rs (throughput samples, counters, histograms)
//!
//! Consumers:
//!     → Log files / stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Correlation id flows through every log line of a request via spans
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
