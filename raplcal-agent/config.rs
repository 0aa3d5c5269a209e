use std::net::SocketAddr;
use std::path::Path;

use raplcal_raw::{Vendor, VendorLayout};
use serde::{Deserialize, Serialize};

use crate::error::{RaplcalError, Result};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Register layout in use, fixed for the process lifetime
    pub vendor: Vendor,
    /// CPU the calling thread is pinned to for the duration of one report
    pub cpu: u32,
    /// Poll ceiling of the counter synchronizer; `None` spins until the counter moves
    pub sync_limit: Option<u64>,
    pub listen: SocketAddr,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            vendor: Vendor::default(),
            cpu: 0,
            sync_limit: None,
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

impl CalibrationConfig {
    pub fn layout(&self) -> VendorLayout {
        self.vendor.layout()
    }

    /// Reject values that cannot produce a meaningful report
    pub fn validate(&self) -> Result<()> {
        if self.sync_limit == Some(0) {
            return Err(RaplcalError::Config(
                "sync limit must be at least 1 poll".to_string(),
            ));
        }

        let cpu_path = format!("/sys/devices/system/cpu/cpu{}", self.cpu);
        if !Path::new(&cpu_path).exists() {
            return Err(RaplcalError::Config(format!(
                "CPU {} does not exist ({cpu_path} missing)",
                self.cpu
            )));
        }

        Ok(())
    }
}
