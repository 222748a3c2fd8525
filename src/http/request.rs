//! Request correlation.
//!
//! # Responsibilities
//! - Generate a locally unique correlation id for every inbound request
//! - Keep ids ordered by arrival so log lines sort naturally
//!
//! # Design Decisions
//! - Ids are nanosecond readings of a monotonic clock anchored to the wall
//!   clock at first use, so they read like timestamps
//! - Two requests in the same nanosecond still get distinct ids: the last
//!   issued id is tracked atomically and every new id is strictly greater

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Opaque per-request token grouping all log lines of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CorrelationId(u64);

static ANCHOR: OnceLock<(u64, Instant)> = OnceLock::new();
static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

impl CorrelationId {
    /// Issue the next id.
    pub fn next() -> Self {
        let now = clock_nanos();
        let previous = LAST_ISSUED
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last.wrapping_add(1)))
            })
            .unwrap_or_else(|last| last);
        Self(now.max(previous.wrapping_add(1)))
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn clock_nanos() -> u64 {
    let (epoch_nanos, started) = *ANCHOR.get_or_init(|| {
        let epoch_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        (epoch_nanos, Instant::now())
    });
    epoch_nanos.saturating_add(started.elapsed().as_nanos() as u64)
}
