pub mod report;
pub mod types;

pub use report::{CalibrationReport, Report, TimingReport};
pub use types::{CalibrationMetric, CalibrationSample, Endpoint, Outcome, TimingSample};
