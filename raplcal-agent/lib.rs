// Macros (must be first for visibility)
#[macro_use]
pub mod macros;

pub mod common;
pub mod config;
pub mod counters;
pub mod error;
pub mod host;
pub mod metrics;
pub mod orchestrator;
pub mod prom;
pub mod server;

pub use config::CalibrationConfig;
pub use error::{CalibrationFailure, RaplcalError, Result};
pub use orchestrator::Calibrator;
pub use prom::CalibrationMetrics;
