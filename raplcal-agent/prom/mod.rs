pub mod rapl;

pub use rapl::CalibrationMetrics;
