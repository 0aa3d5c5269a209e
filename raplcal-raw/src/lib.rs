//! # raplcal-raw
//!
//! Register definitions for RAPL energy counter calibration.
//!
//! This crate provides the vendor register layouts (MSR addresses and CPUID
//! capability bits), the energy unit decoder, the raw
//! `eax/ebx/ecx/edx` output quadruple and low-level MSR reads through
//! `/dev/cpu/*/msr`.
//!
//! ## Features
//!
//! Select the build-time default vendor via feature flags:
//! - `amd` (default) - AMD Family 17h+ layout
//! - `intel` - Intel layout (takes effect when `amd` is disabled)
//! - `serde` - `Serialize`/`Deserialize` for [`Vendor`]
//!
//! ## Usage
//!
//! ```ignore
//! use raplcal_raw::{MsrDevice, DEFAULT_VENDOR};
//!
//! let layout = DEFAULT_VENDOR.layout();
//! let msr = MsrDevice::open(0)?;
//! let energy = msr.read_registers(layout.pkg_energy)?.eax;
//! ```

pub mod arch;
pub mod msr;
pub mod register;

pub use arch::rapl::decode_energy_units;
pub use arch::{Vendor, VendorLayout, DEFAULT_VENDOR, MSR_CAPABILITY};
pub use msr::{read_msr, MsrDevice, MsrError, Result};
pub use register::{CapabilityBit, GpRegister, Registers};
