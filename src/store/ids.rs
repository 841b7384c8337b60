use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Allocates record ids.
///
/// Ids are epoch-millisecond stamps nudged forward so that two allocations in
/// the same millisecond still come out distinct and strictly increasing. The
/// id doubles as the artifact-name stamp, which keeps concurrent pipeline
/// runs from colliding on temp files.
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => last = observed,
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
