//! Intel RAPL register definitions
//!
//! ## References
//!
//! - Intel® 64 and IA-32 Architectures Software Developer's Manual, Volume 3B
//! - Section 15.10: Platform Specific Power Management Support

use crate::register::{CapabilityBit, GpRegister};

/// MSR addresses for Intel RAPL
pub mod msr {
    /// RAPL Power Unit - energy, power and time unit exponents
    pub const MSR_RAPL_POWER_UNIT: u32 = 0x606;

    /// Package Energy Status - package accumulator (low 32 bits)
    pub const MSR_PKG_ENERGY_STATUS: u32 = 0x611;
}

/// Thermal and power management leaf
pub const THERMAL_POWER_LEAF: u32 = 0x6;

/// Position of the power limit notification flag in `CPUID.06H:EAX`.
///
/// Intel does not enumerate RAPL through CPUID. PLN is present on every
/// part that implements the package RAPL MSRs and is used as the proxy.
pub const RAPL_CAPABILITY_BIT: u8 = 4;

pub const RAPL_CAPABILITY: CapabilityBit =
    CapabilityBit::new(THERMAL_POWER_LEAF, GpRegister::Eax, RAPL_CAPABILITY_BIT);
