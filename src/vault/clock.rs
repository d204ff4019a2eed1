//! Ledger clocks.
//!
//! The vault never reads wall time directly. Readiness is a comparison
//! against whatever `LedgerClock::now` returns at call time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonic source of ledger time, in seconds.
pub trait LedgerClock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock ledger time (seconds since the Unix epoch).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl LedgerClock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests and scripted replays.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the vault. Time never moves backwards.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move time forward by `secs`. Returns the new time.
    pub fn advance(&self, secs: u64) -> u64 {
        let mut current = self.now.load(Ordering::SeqCst);
        loop {
            let next = current.saturating_add(secs);
            match self
                .now
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Jump to `timestamp` if it is later than the current time.
    pub fn set(&self, timestamp: u64) {
        self.now.fetch_max(timestamp, Ordering::SeqCst);
    }
}

impl LedgerClock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
