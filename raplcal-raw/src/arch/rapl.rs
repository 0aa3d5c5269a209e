//! RAPL power-unit register decoding
//!
//! AMD (`MSR C001_0299`) and Intel (`MSR 0x606`) place the energy status
//! unit exponent at the same bits.
//!
//! ## References
//!
//! - Intel® 64 and IA-32 Architectures Software Developer's Manual, Volume 3B, Section 15.10
//! - AMD Processor Programming Reference (PPR) for Family 17h/19h, `Core::X86::Msr::RAPL_PWR_UNIT`

/// Mask of the energy status unit field (bits 11:8).
///
/// The vendor manuals document the field as bits 12:8. Only the low nibble
/// is decoded, so an exponent of 16 or more is reported modulo 16.
pub const ENERGY_UNIT_MASK: u32 = 0x0000_0F00;

/// Bit offset of the energy status unit field
pub const ENERGY_UNIT_SHIFT: u32 = 8;

/// Extract the energy unit exponent `u` (one tick is `2^-u` joules).
///
/// Every bit pattern is accepted as-is.
pub const fn decode_energy_units(power_unit: u32) -> u32 {
    (power_unit & ENERGY_UNIT_MASK) >> ENERGY_UNIT_SHIFT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_energy_units_ignores_other_bits() {
        assert_eq!(decode_energy_units(0x0000_0B00), 11);
        assert_eq!(decode_energy_units(0xFFFF_FBFF), 11);
        assert_eq!(decode_energy_units(0x000A_1B03), 11);
    }

    #[test]
    fn test_bit_12_is_outside_the_field() {
        // AMD default power-unit value, ESU nominally 16
        assert_eq!(decode_energy_units(0x000A_1003), 0);
        assert_eq!(decode_energy_units(0x000A_0E03), 14);
    }
}
