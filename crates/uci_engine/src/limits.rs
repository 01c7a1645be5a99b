//! Search budgets and run cancellation.
//!
//! The engine gets a fixed think time per position. The evaluator enforces a
//! hard deadline of think time plus a grace period so that one hung engine
//! cannot stall a whole batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Time budgets for one engine session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    /// Think time requested with `go movetime`.
    pub move_time: Duration,
    /// Extra time allowed for the engine to report after `move_time`.
    pub grace: Duration,
    /// Budget for the `uci` / `isready` handshake.
    pub handshake: Duration,
}

impl SearchLimits {
    /// Limits with the given think time and default grace periods.
    pub fn move_time(move_time: Duration) -> Self {
        Self {
            move_time,
            ..Self::default()
        }
    }

    /// Hard deadline for one search.
    pub fn deadline(&self) -> Duration {
        self.move_time + self.grace
    }

    pub fn move_time_millis(&self) -> u128 {
        self.move_time.as_millis().max(1)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            move_time: Duration::from_millis(100),
            grace: Duration::from_secs(1),
            handshake: Duration::from_secs(10),
        }
    }
}

/// Shared stop flag checked between games and between moves.
///
/// Cheap to clone; every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next graceful point.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod limits_tests;
