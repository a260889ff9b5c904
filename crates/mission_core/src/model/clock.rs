//! Time sources for write paths.
//!
//! Services never read the system clock directly; they ask a `Clock` so a
//! single mutation observes one consistent `now`.

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in Unix epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually driven clock.
///
/// Every read returns the current value and then advances it by `step_ms`,
/// so consecutive writes get strictly increasing timestamps when
/// `step_ms > 0`.
#[derive(Debug)]
pub struct ManualClock {
    current: AtomicI64,
    step_ms: i64,
}

impl ManualClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            current: AtomicI64::new(start_ms),
            step_ms,
        }
    }

    /// Clock that always returns `at_ms`.
    pub fn fixed(at_ms: i64) -> Self {
        Self::new(at_ms, 0)
    }

    /// Moves the clock to `at_ms`.
    pub fn set(&self, at_ms: i64) {
        self.current.store(at_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.current.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}
