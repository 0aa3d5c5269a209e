//! Generic register abstractions shared by CPUID and MSR reads

/// One of the four general purpose registers written by `cpuid` and `rdmsr`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpRegister {
    Eax,
    Ebx,
    Ecx,
    Edx,
}

impl GpRegister {
    pub fn name(&self) -> &'static str {
        match self {
            GpRegister::Eax => "eax",
            GpRegister::Ebx => "ebx",
            GpRegister::Ecx => "ecx",
            GpRegister::Edx => "edx",
        }
    }
}

/// Raw outputs of a feature query or register read, returned verbatim
///
/// `rdmsr` only writes `eax` (low half) and `edx` (high half); `ebx` and
/// `ecx` are reported as zero for register reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

impl Registers {
    pub const fn new(eax: u32, ebx: u32, ecx: u32, edx: u32) -> Self {
        Self { eax, ebx, ecx, edx }
    }

    /// Split a 64-bit MSR value into its `edx:eax` halves
    pub const fn from_msr_value(value: u64) -> Self {
        Self {
            eax: value as u32,
            ebx: 0,
            ecx: 0,
            edx: (value >> 32) as u32,
        }
    }

    /// Reassemble `edx:eax` into the full 64-bit register value
    pub const fn wide(&self) -> u64 {
        ((self.edx as u64) << 32) | self.eax as u64
    }

    pub const fn get(&self, register: GpRegister) -> u32 {
        match register {
            GpRegister::Eax => self.eax,
            GpRegister::Ebx => self.ebx,
            GpRegister::Ecx => self.ecx,
            GpRegister::Edx => self.edx,
        }
    }
}

/// Location of a single capability bit in the output of a CPUID leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityBit {
    /// CPUID leaf selector placed in `eax`
    pub leaf: u32,
    /// Output register holding the flag
    pub register: GpRegister,
    /// Bit position within that register
    pub bit: u8,
}

impl CapabilityBit {
    pub const fn new(leaf: u32, register: GpRegister, bit: u8) -> Self {
        Self {
            leaf,
            register,
            bit,
        }
    }

    pub const fn mask(&self) -> u32 {
        1 << self.bit
    }

    /// Test the flag in the outputs of `cpuid(self.leaf)`
    pub const fn is_set(&self, outputs: &Registers) -> bool {
        outputs.get(self.register) & self.mask() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_wide_value() {
        let regs = Registers::from_msr_value(0x1234_5678_9ABC_DEF0);
        assert_eq!(regs.eax, 0x9ABC_DEF0);
        assert_eq!(regs.edx, 0x1234_5678);
        assert_eq!(regs.ebx, 0);
        assert_eq!(regs.ecx, 0);
        assert_eq!(regs.wide(), 0x1234_5678_9ABC_DEF0);
    }

    #[test]
    fn test_capability_bit_reads_only_its_register() {
        let bit = CapabilityBit::new(0x1, GpRegister::Edx, 5);

        assert!(bit.is_set(&Registers::new(0, 0, 0, 1 << 5)));
        assert!(!bit.is_set(&Registers::new(1 << 5, 1 << 5, 1 << 5, 0)));
        assert!(!bit.is_set(&Registers::new(0, 0, 0, !(1 << 5))));
    }
}
