use raplcal_raw::{decode_energy_units, VendorLayout};

use crate::common::RegisterAccess;
use crate::error::Result;

/// Energy unit exponent `u` of a power-unit register value (one tick is `2^-u` J)
pub fn decode_units(power_unit: u32) -> u32 {
    decode_energy_units(power_unit)
}

/// Reads the vendor's power-unit and package-energy registers
///
/// This is the only place that resolves RAPL register addresses; the
/// synchronizer and the report assembler go through it.
pub struct RaplMonitor<'a, A: RegisterAccess> {
    access: &'a A,
    layout: VendorLayout,
}

impl<'a, A: RegisterAccess> RaplMonitor<'a, A> {
    pub fn new(access: &'a A, layout: VendorLayout) -> Self {
        Self { access, layout }
    }

    /// Energy unit exponent of the package domain
    pub fn energy_units(&self) -> Result<u32> {
        let regs = self.access.read_register(self.layout.power_unit)?;
        let units = decode_units(regs.eax);
        tracing::debug!("Power unit 0x{:08x}: energy units {}", regs.eax, units);
        Ok(units)
    }

    /// Current value of the package energy accumulator (low 32 bits)
    #[inline]
    pub fn sample_energy(&self) -> Result<u32> {
        Ok(self.access.read_register(self.layout.pkg_energy)?.eax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ScriptedAccess;
    use raplcal_raw::Vendor;

    #[test]
    fn test_decode_units_reads_bits_11_to_8() {
        assert_eq!(decode_units(0b1011 << 8), 11);
        assert_eq!(decode_units(0xFFFF_F0FF | (0b1011 << 8)), 11);
        assert_eq!(decode_units(0x0000_0A00), 10);
        assert_eq!(decode_units(0), 0);
    }

    #[test]
    fn test_sample_energy_keeps_low_half() {
        let layout = Vendor::Amd.layout();
        let access = ScriptedAccess::new().with_register(layout.pkg_energy, 0xDEAD_0000_0000_1234);
        let monitor = RaplMonitor::new(&access, layout);
        assert_eq!(monitor.sample_energy().unwrap(), 0x1234);
    }

    #[test]
    fn test_energy_units_from_vendor_register() {
        let layout = Vendor::Intel.layout();
        let access = ScriptedAccess::new().with_register(layout.power_unit, 0x000A_0E03);
        let monitor = RaplMonitor::new(&access, layout);

        assert_eq!(monitor.energy_units().unwrap(), 14);
        assert_eq!(access.read_count(0x606), 1);
        assert_eq!(access.read_count(0xC001_0299), 0);
    }
}
