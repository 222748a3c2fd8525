//! Round-robin target rotation.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin selector over a fixed, ordered rotation set.
///
/// The cursor always holds the index of the next target to hand out, so it
/// stays in `0..len` and never overflows. Advancing it is a single
/// compare-and-swap; no lock is held and concurrent callers each receive a
/// distinct slot in cyclic order.
#[derive(Debug, Default)]
pub struct RoundRobin {
    targets: Vec<String>,
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Return the next target, or `None` when the rotation set is empty.
    pub fn next(&self) -> Option<&str> {
        let len = self.targets.len();
        if len == 0 {
            return None;
        }

        let mut current = self.cursor.load(Ordering::Relaxed);
        loop {
            let next = (current + 1) % len;
            match self.cursor.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(&self.targets[current]),
                Err(actual) => current = actual,
            }
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}
