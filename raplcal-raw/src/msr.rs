//! MSR (Model-Specific Register) read primitives
//!
//! Register reads go through the Linux `msr` driver (`/dev/cpu/*/msr`), which
//! executes `rdmsr` on the target CPU and requires root or `CAP_SYS_RAWIO`.
//! For cached per-CPU handles, use the higher-level abstractions in raplcal.

use std::fs::File;
use std::os::unix::fs::FileExt;

use crate::register::Registers;

pub type Result<T> = std::result::Result<T, MsrError>;

/// Errors that can occur during MSR operations
#[derive(Debug, thiserror::Error)]
pub enum MsrError {
    #[error("Failed to open MSR device for CPU {cpu}: {source}")]
    OpenFailed { cpu: u32, source: std::io::Error },

    #[error("Failed to read MSR 0x{msr:X} on CPU {cpu}: {source}")]
    ReadFailed {
        cpu: u32,
        msr: u32,
        source: std::io::Error,
    },
}

/// An open `/dev/cpu/<cpu>/msr` device
///
/// Reads use positioned I/O, so a shared reference is enough and no seek
/// state is kept between calls.
#[derive(Debug)]
pub struct MsrDevice {
    file: File,
    cpu: u32,
}

impl MsrDevice {
    /// Open the MSR device of one CPU
    ///
    /// # Errors
    ///
    /// Returns [`MsrError::OpenFailed`] if the `msr` module is not loaded or
    /// the process lacks the privilege to open the device.
    pub fn open(cpu: u32) -> Result<Self> {
        let path = format!("/dev/cpu/{cpu}/msr");
        let file = File::open(&path).map_err(|e| MsrError::OpenFailed { cpu, source: e })?;
        Ok(Self { file, cpu })
    }

    /// Read the 64-bit value of an MSR
    pub fn read(&self, msr: u32) -> Result<u64> {
        let mut buffer = [0u8; 8];
        self.file
            .read_exact_at(&mut buffer, u64::from(msr))
            .map_err(|e| MsrError::ReadFailed {
                cpu: self.cpu,
                msr,
                source: e,
            })?;
        Ok(u64::from_le_bytes(buffer))
    }

    /// Read an MSR and split it into the `edx:eax` outputs of `rdmsr`
    pub fn read_registers(&self, msr: u32) -> Result<Registers> {
        self.read(msr).map(Registers::from_msr_value)
    }

    pub fn cpu(&self) -> u32 {
        self.cpu
    }
}

/// Read a 64-bit value from an MSR, opening the device for this call only
///
/// # Example
///
/// ```ignore
/// use raplcal_raw::read_msr;
///
/// let value = read_msr(0, 0xC001_029B)?;
/// println!("PKG_ENERGY_STATUS = 0x{:08X}", value as u32);
/// ```
pub fn read_msr(cpu: u32, msr: u32) -> Result<u64> {
    MsrDevice::open(cpu)?.read(msr)
}
