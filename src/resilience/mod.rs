//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (derive the forward deadline from the route ceiling
//!       and any deadline inherited from the caller)
//!     → transport runs the call and the body read under that deadline
//! ```
//!
//! # Design Decisions
//! - Every backend call has a deadline; the earlier of the two limits wins
//! - No retries: a failed forward is reported to the caller once
//! - Cancellation is by dropping the in-flight future

pub mod timeouts;
