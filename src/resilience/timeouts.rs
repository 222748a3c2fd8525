//! Timeout enforcement.
//!
//! # Responsibilities
//! - Derive a per-request deadline from a fixed ceiling
//! - Compose it with any deadline the caller already carries
//! - Wrap backend calls so they are dropped when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A deadline is an absolute instant, so composing two is a `min`
//! - Cancellation is by drop: when the inbound request future is dropped
//!   (client gone), the wrapped backend call goes with it

use std::future::Future;
use std::time::Duration;

use tokio::time::{error::Elapsed, Instant};

/// An absolute point in time after which in-flight work is abandoned.
///
/// Stored in request extensions when an outer layer imposes its own limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    /// Derive a deadline bounded by `ceiling` that never outlives `inherited`.
    pub fn derive(ceiling: Duration, inherited: Option<Deadline>) -> Self {
        let own = Self::after(ceiling);
        match inherited {
            Some(outer) => own.min(outer),
            None => own,
        }
    }

    /// Time left before expiry, zero once passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Run `future` to completion unless the deadline passes first.
    pub async fn run<F>(self, future: F) -> Result<F::Output, Elapsed>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.at, future).await
    }
}
