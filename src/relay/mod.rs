//! Request relay subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (route already matched)
//!     → pipeline.rs (preflight? answer locally)
//!     → snapshot.rs (drain body once into shared bytes)
//!     → diagnostics.rs (audit snapshot of inbound request)
//!     → target.rs (method override, backend URL)
//!     → round-robin backend pick (load_balancer)
//!     → http::client (forward under deadline, read full response)
//!     → diagnostics.rs (audit snapshots of outbound request and response)
//!     → http::response (relay status, headers, body)
//! ```
//!
//! # Design Decisions
//! - Failures map to a fixed status via error.rs; no retries
//! - Snapshots are for logging only and never affect control flow

pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod snapshot;
pub mod target;

pub use error::RelayError;
pub use pipeline::{PipelineSettings, RelayPipeline};
pub use snapshot::RequestSnapshot;
