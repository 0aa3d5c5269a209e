//! Privileged register access capability
//!
//! The calibration core only ever talks to hardware through
//! [`RegisterAccess`]. [`HardwareAccess`] issues the real instructions;
//! [`ScriptedAccess`](crate::common::ScriptedAccess) replays scripted values.

use raplcal_raw::Registers;

use crate::common::{cpuid, msr};
use crate::error::Result;

pub trait RegisterAccess: Send + Sync {
    /// Whether the feature-query instruction exists on this platform
    fn has_feature_query(&self) -> bool {
        true
    }

    /// Issue `cpuid` with `leaf` in `eax` and return the four outputs verbatim
    fn query_features(&self, leaf: u32) -> Registers;

    /// Issue `rdmsr` for `address` and return `edx:eax` (`ebx`/`ecx` are zero)
    ///
    /// Reading a register the processor does not implement is a programming
    /// error; callers check capability through the feature detector first.
    fn read_register(&self, address: u32) -> Result<Registers>;
}

/// Production adapter: CPUID on the calling CPU, MSRs through `/dev/cpu/<cpu>/msr`
#[derive(Debug, Clone, Copy)]
pub struct HardwareAccess {
    cpu: u32,
}

impl HardwareAccess {
    pub fn new(cpu: u32) -> Self {
        Self { cpu }
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }
}

impl RegisterAccess for HardwareAccess {
    fn has_feature_query(&self) -> bool {
        cfg!(target_arch = "x86_64")
    }

    fn query_features(&self, leaf: u32) -> Registers {
        cpuid::cpuid(leaf, 0)
    }

    fn read_register(&self, address: u32) -> Result<Registers> {
        msr::read_msr(self.cpu, address)
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    fn has_feature_query(&self) -> bool {
        (**self).has_feature_query()
    }

    fn query_features(&self, leaf: u32) -> Registers {
        (**self).query_features(leaf)
    }

    fn read_register(&self, address: u32) -> Result<Registers> {
        (**self).read_register(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_arch = "x86_64")]
    fn test_hardware_feature_query_matches_cpuid() {
        let access = HardwareAccess::new(0);
        assert!(access.has_feature_query());
        assert_eq!(access.query_features(0), cpuid::cpuid(0, 0));
    }
}
