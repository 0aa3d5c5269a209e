pub mod features;
pub mod monitor;
pub mod sync;

pub use features::FeatureDetector;
pub use monitor::{decode_units, RaplMonitor};
pub use sync::{CounterSynchronizer, SyncSample};
