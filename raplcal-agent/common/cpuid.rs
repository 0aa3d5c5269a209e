use raplcal_raw::{Registers, Vendor};

#[cfg(target_arch = "x86_64")]
pub fn cpuid(leaf: u32, subleaf: u32) -> Registers {
    let mut ebx: u32;
    let mut edx: u32;
    let mut eax_out = leaf;
    let mut ecx_out = subleaf;

    // rbx is reserved by LLVM, so it is saved around the instruction
    unsafe {
        std::arch::asm!(
            "mov {0:r}, rbx",
            "cpuid",
            "xchg {0:r}, rbx",
            out(reg) ebx,
            inout("eax") eax_out,
            inout("ecx") ecx_out,
            out("edx") edx,
            options(nostack, preserves_flags)
        );
    }

    Registers::new(eax_out, ebx, ecx_out, edx)
}

#[cfg(not(target_arch = "x86_64"))]
pub fn cpuid(_leaf: u32, _subleaf: u32) -> Registers {
    Registers::default()
}

/// Vendor identification string from leaf 0 (`ebx`, `edx`, `ecx` in that order)
pub fn vendor_string() -> String {
    let regs = cpuid(0, 0);
    let mut bytes = Vec::with_capacity(12);
    for word in [regs.ebx, regs.edx, regs.ecx] {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    String::from_utf8_lossy(&bytes).trim_end_matches('\0').to_string()
}

/// Vendor of the running processor, if it is one with a known RAPL layout
pub fn detect_vendor() -> Option<Vendor> {
    let id = vendor_string();
    let vendor = id.parse::<Vendor>().ok();
    tracing::debug!("CPUID vendor string: {:?} -> {:?}", id, vendor);
    vendor
}
