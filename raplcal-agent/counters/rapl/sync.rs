//! Edge alignment of the package energy counter
//!
//! The accumulator updates at a fixed hardware cadence (about 1 ms) that is
//! far coarser than a register read, so an unsynchronized read lands at an
//! arbitrary phase within the update period. Spinning until the value changes
//! yields a sample taken right after an increment.

use crate::common::RegisterAccess;
use crate::counters::rapl::monitor::RaplMonitor;
use crate::error::{CalibrationFailure, Result};

/// An edge-aligned counter value and the extra polls spent reaching it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSample {
    /// First value read that differs from the starting sample
    pub value: u32,
    /// Polls that returned the starting value again
    pub polls: u64,
}

pub struct CounterSynchronizer<'a, A: RegisterAccess> {
    monitor: &'a RaplMonitor<'a, A>,
    limit: Option<u64>,
}

impl<'a, A: RegisterAccess> CounterSynchronizer<'a, A> {
    /// `limit` caps the polls per synchronization; `None` spins until the counter moves
    pub fn new(monitor: &'a RaplMonitor<'a, A>, limit: Option<u64>) -> Self {
        Self { monitor, limit }
    }

    pub fn synchronize(&self) -> Result<u32> {
        self.synchronize_counted().map(|sample| sample.value)
    }

    /// Busy-poll without yielding until the counter differs from its first reading
    pub fn synchronize_counted(&self) -> Result<SyncSample> {
        let start = self.monitor.sample_energy()?;
        let mut polls = 0u64;

        loop {
            let end = self.monitor.sample_energy()?;
            if end != start {
                return Ok(SyncSample { value: end, polls });
            }

            polls += 1;
            if let Some(limit) = self.limit {
                if polls >= limit {
                    tracing::warn!(
                        "Energy counter stuck at {} after {} polls",
                        start,
                        polls
                    );
                    return Err(CalibrationFailure::SyncTimeout { limit }.into());
                }
            }
        }
    }
}
