//! AMD Family 17h+ (Zen) RAPL register definitions
//!
//! ## References
//!
//! - AMD Processor Programming Reference (PPR) for AMD Family 17h/19h
//! - `CPUID_Fn80000007_EDX` Advanced Power Management Information

use crate::register::{CapabilityBit, GpRegister};

/// MSR addresses for AMD RAPL
pub mod msr {
    /// RAPL Power Unit - energy, power and time unit exponents
    pub const MSR_RAPL_POWER_UNIT: u32 = 0xC001_0299;

    /// Package Energy Status - package accumulator (low 32 bits)
    pub const MSR_PKG_ENERGY_STATUS: u32 = 0xC001_029B;
}

/// Extended leaf carrying the advanced power management flags
pub const APM_LEAF: u32 = 0x8000_0007;

/// Position of the RAPL flag in `CPUID_Fn80000007_EDX`.
///
/// Earlier revisions of the calibration module tested bit 5 and bit 12 of
/// the same register instead. Bit 12 is `ProcPowerReporting` and bit 5 is
/// unrelated to energy accounting in current PPRs. Confirm against the PPR
/// of the target family before relying on this value.
pub const RAPL_CAPABILITY_BIT: u8 = 14;

pub const RAPL_CAPABILITY: CapabilityBit =
    CapabilityBit::new(APM_LEAF, GpRegister::Edx, RAPL_CAPABILITY_BIT);
