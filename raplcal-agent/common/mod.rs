pub mod access;
pub mod affinity;
pub mod clock;
pub mod cpuid;
pub mod msr;
pub mod scripted;

pub use access::{HardwareAccess, RegisterAccess};
pub use affinity::AffinityGuard;
pub use clock::{MonotonicClock, SteppingClock, SystemMonotonic};
pub use msr::Msr;
pub use scripted::{AccessEvent, ScriptedAccess};
