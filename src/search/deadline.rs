//! Two-stage cooperative deadline
//!
//! The soft stage tells iterative deepening not to start another depth,
//! the hard stage aborts the depth in flight. Both latch once reached.
//! The hard stage can also be raised from another thread through the
//! shared stop flag.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use reversi::search::Deadline;
//!
//! let deadline = Deadline::new(Duration::from_millis(100), Duration::from_millis(800));
//! assert!(!deadline.soft_expired());
//! deadline.cancel();
//! assert!(deadline.is_stopped());
//! assert!(deadline.soft_expired());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Deadline {
    start: Instant,
    soft: Duration,
    hard: Duration,
    soft_hit: AtomicBool,
    stop: Arc<AtomicBool>,
}

impl Deadline {
    /// Deadline with a soft and a hard stage measured from now.
    /// The soft stage never lies after the hard one.
    pub fn new(soft: Duration, hard: Duration) -> Self {
        Self {
            start: Instant::now(),
            soft: soft.min(hard),
            hard,
            soft_hit: AtomicBool::new(false),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Soft stage at `budget / branching_factor`, hard stage at `budget`
    pub fn from_budget(budget: Duration, branching_factor: u32) -> Self {
        Self::new(budget / branching_factor.max(1), budget)
    }

    /// Never expires on its own, only through [`cancel`](Self::cancel)
    pub fn unbounded() -> Self {
        Self::new(Duration::MAX, Duration::MAX)
    }

    /// Use an externally owned stop flag
    #[must_use]
    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Abort the search at its next checkpoint
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Hard stage already reached, without reading the clock
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Check the clock and latch the hard stage if exceeded
    #[inline]
    pub fn check_time(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        if self.start.elapsed() >= self.hard {
            self.stop.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// True once no new depth should be started
    pub fn soft_expired(&self) -> bool {
        if self.soft_hit.load(Ordering::Relaxed) || self.check_time() {
            return true;
        }
        if self.start.elapsed() >= self.soft {
            self.soft_hit.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn soft_limit(&self) -> Duration {
        self.soft
    }

    pub fn hard_limit(&self) -> Duration {
        self.hard
    }
}
