//! Vendor-specific register layouts
//!
//! AMD and Intel expose the same RAPL counters at different MSR addresses
//! and advertise them through different CPUID leaves. A [`Vendor`] resolves
//! to one [`VendorLayout`] that every component consumes, so the calibration
//! logic itself is vendor-agnostic.
//!
//! ## Supported Vendors
//!
//! - **AMD** (`amd` feature, default) - Family 17h and newer
//! - **Intel** (`intel` feature) - Sandy Bridge and newer

pub mod amd;
pub mod intel;
pub mod rapl;

use std::fmt;
use std::str::FromStr;

use crate::register::{CapabilityBit, GpRegister};

/// CPUID leaf 1 (processor info and feature bits)
pub const FEATURE_INFO_LEAF: u32 = 0x1;

/// `CPUID.01H:EDX[5]` - `rdmsr`/`wrmsr` supported
pub const MSR_CAPABILITY: CapabilityBit = CapabilityBit::new(FEATURE_INFO_LEAF, GpRegister::Edx, 5);

/// CPU vendor whose register layout is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Vendor {
    Amd,
    Intel,
}

/// Vendor selected at build time through the `amd` / `intel` features
#[cfg(not(all(feature = "intel", not(feature = "amd"))))]
pub const DEFAULT_VENDOR: Vendor = Vendor::Amd;

#[cfg(all(feature = "intel", not(feature = "amd")))]
pub const DEFAULT_VENDOR: Vendor = Vendor::Intel;

impl Vendor {
    pub fn name(&self) -> &'static str {
        match self {
            Vendor::Amd => "amd",
            Vendor::Intel => "intel",
        }
    }

    pub const fn layout(&self) -> VendorLayout {
        match self {
            Vendor::Amd => VendorLayout {
                power_unit: amd::msr::MSR_RAPL_POWER_UNIT,
                pkg_energy: amd::msr::MSR_PKG_ENERGY_STATUS,
                rapl_capability: amd::RAPL_CAPABILITY,
            },
            Vendor::Intel => VendorLayout {
                power_unit: intel::msr::MSR_RAPL_POWER_UNIT,
                pkg_energy: intel::msr::MSR_PKG_ENERGY_STATUS,
                rapl_capability: intel::RAPL_CAPABILITY,
            },
        }
    }
}

impl Default for Vendor {
    fn default() -> Self {
        DEFAULT_VENDOR
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vendor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "amd" | "authenticamd" => Ok(Vendor::Amd),
            "intel" | "genuineintel" => Ok(Vendor::Intel),
            other => Err(format!("unsupported vendor '{other}' (expected amd or intel)")),
        }
    }
}

/// Register addresses and capability bit of one vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorLayout {
    /// Power-unit MSR holding the energy unit exponent
    pub power_unit: u32,
    /// Package energy accumulator MSR
    pub pkg_energy: u32,
    /// CPUID flag advertising energy accounting
    pub rapl_capability: CapabilityBit,
}
