use nix::time::{clock_gettime, ClockId};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Source of monotonic nanosecond timestamps
pub trait MonotonicClock: Send + Sync {
    fn now_ns(&self) -> Result<u64>;
}

/// `CLOCK_MONOTONIC`, the userspace counterpart of `ktime_get_ns`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMonotonic;

impl MonotonicClock for SystemMonotonic {
    fn now_ns(&self) -> Result<u64> {
        let ts = clock_gettime(ClockId::CLOCK_MONOTONIC)?;
        Ok(ts.tv_sec() as u64 * 1_000_000_000 + ts.tv_nsec() as u64)
    }
}

/// Deterministic clock advancing by a fixed step on every reading
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicU64,
    step: u64,
}

impl SteppingClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
            step,
        }
    }
}

impl MonotonicClock for SteppingClock {
    fn now_ns(&self) -> Result<u64> {
        Ok(self.next.fetch_add(self.step, Ordering::Relaxed))
    }
}
