use std::io;
use thiserror::Error;

/// Everything that can stop a report, from unsupported hardware to I/O faults
#[derive(Error, Debug)]
pub enum RaplcalError {
    #[error(transparent)]
    Calibration(#[from] CalibrationFailure),

    #[error("MSR operation failed: {0}")]
    Msr(#[from] raplcal_raw::MsrError),

    #[error("Affinity operation failed: {0}")]
    Affinity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scripted register access exhausted: {0}")]
    ScriptExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Nix error: {0}")]
    Nix(#[from] nix::Error),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, RaplcalError>;

/// Expected, user-visible outcomes of a report on unsupported hardware
///
/// The `Display` text is what lands in the `error` field of the report.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationFailure {
    #[error("cpuid failed")]
    UnsupportedFeatureQuery,

    #[error("rdmsr failed")]
    UnsupportedRegisterRead,

    #[error("rapl failed")]
    UnsupportedEnergyAccounting,

    /// The energy counter did not change within the configured poll ceiling
    #[error("sync timeout")]
    SyncTimeout { limit: u64 },
}
