use once_cell::sync::Lazy;
use parking_lot::RwLock;
use raplcal_raw::{MsrDevice, Registers};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;

/// Process-wide cache of open `/dev/cpu/*/msr` devices
pub struct Msr {
    devices: RwLock<HashMap<u32, Arc<MsrDevice>>>,
}

impl Msr {
    fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
        }
    }

    pub fn instance() -> &'static Msr {
        static INSTANCE: Lazy<Msr> = Lazy::new(Msr::new);
        &INSTANCE
    }

    fn get_device(&self, cpu: u32) -> Result<Arc<MsrDevice>> {
        {
            let devices = self.devices.read();
            if let Some(device) = devices.get(&cpu) {
                return Ok(Arc::clone(device));
            }
        }

        let mut devices = self.devices.write();
        if let Some(device) = devices.get(&cpu) {
            return Ok(Arc::clone(device));
        }

        let device = Arc::new(MsrDevice::open(cpu)?);
        tracing::info!("Opened MSR device for CPU {}", cpu);
        devices.insert(cpu, Arc::clone(&device));
        Ok(device)
    }

    pub fn read(&self, cpu: u32, addr: u32) -> Result<Registers> {
        let device = self.get_device(cpu)?;
        let regs = device.read_registers(addr)?;
        tracing::trace!(
            "MSR read: CPU {} MSR 0x{:08x} = 0x{:016x}",
            cpu,
            addr,
            regs.wide()
        );
        Ok(regs)
    }
}

pub fn read_msr(cpu: u32, addr: u32) -> Result<Registers> {
    Msr::instance().read(cpu, addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msr_singleton() {
        let msr1 = Msr::instance();
        let msr2 = Msr::instance();
        assert!(std::ptr::eq(msr1, msr2));
    }

    #[test]
    fn test_missing_device_is_not_cached() {
        let msr = Msr::instance();
        assert!(msr.read(u32::MAX, 0x10).is_err());
        assert!(!msr.devices.read().contains_key(&u32::MAX));
    }
}
