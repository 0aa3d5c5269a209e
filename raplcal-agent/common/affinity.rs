use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
use nix::unistd::Pid;

use crate::error::{RaplcalError, Result};

/// Pins the calling thread to one CPU until dropped
///
/// CPUID executes on whichever CPU runs the caller, and a timing report is
/// only one tick period if both synchronizations observe the same package.
pub struct AffinityGuard {
    old_affinity: CpuSet,
    cpu: u32,
}

impl AffinityGuard {
    pub fn new(cpu: u32) -> Result<Self> {
        let old_affinity = sched_getaffinity(Pid::from_raw(0))
            .map_err(|e| RaplcalError::Affinity(format!("Failed to get affinity: {e}")))?;

        let mut new_affinity = CpuSet::new();
        new_affinity.set(cpu as usize).map_err(|e| {
            RaplcalError::Affinity(format!("Failed to set CPU {cpu} in set: {e}"))
        })?;

        sched_setaffinity(Pid::from_raw(0), &new_affinity).map_err(|e| {
            RaplcalError::Affinity(format!("Failed to set affinity to CPU {cpu}: {e}"))
        })?;

        tracing::trace!("Pinned thread to CPU {}", cpu);

        Ok(Self { old_affinity, cpu })
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }
}

impl Drop for AffinityGuard {
    fn drop(&mut self) {
        if let Err(e) = sched_setaffinity(Pid::from_raw(0), &self.old_affinity) {
            tracing::warn!("Failed to restore affinity after CPU {}: {}", self.cpu, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_guard_restores_mask() {
        let before = sched_getaffinity(Pid::from_raw(0)).unwrap();
        {
            let guard = AffinityGuard::new(0);
            if let Ok(guard) = guard {
                let pinned = sched_getaffinity(Pid::from_raw(0)).unwrap();
                assert!(pinned.is_set(0).unwrap());
                assert_eq!(guard.cpu(), 0);
            }
        }
        let after = sched_getaffinity(Pid::from_raw(0)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_out_of_range_cpu_rejected() {
        assert!(matches!(
            AffinityGuard::new(u32::MAX),
            Err(RaplcalError::Affinity(_))
        ));
    }
}
