pub mod calibrator;

pub use calibrator::Calibrator;
