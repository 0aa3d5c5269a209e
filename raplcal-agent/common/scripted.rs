//! Scripted register access for exercising the calibration core without hardware

use parking_lot::Mutex;
use raplcal_raw::{CapabilityBit, Registers, Vendor, MSR_CAPABILITY};
use std::collections::{HashMap, VecDeque};

use crate::common::access::RegisterAccess;
use crate::error::{RaplcalError, Result};

/// One call made through a [`ScriptedAccess`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEvent {
    Query(u32),
    Read(u32),
}

/// Test adapter returning scripted CPUID leaves and MSR values
///
/// Unscripted leaves read as all-zero. A register backed by a sequence
/// yields one value per read and fails once the sequence is exhausted, so a
/// synchronizer that never sees an edge ends the test instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedAccess {
    no_feature_query: bool,
    leaves: HashMap<u32, Registers>,
    fixed: HashMap<u32, Registers>,
    sequences: Mutex<HashMap<u32, VecDeque<u32>>>,
    events: Mutex<Vec<AccessEvent>>,
}

impl ScriptedAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hardware that passes every feature gate for `vendor`
    pub fn supported(vendor: Vendor) -> Self {
        Self::new()
            .with_capability(MSR_CAPABILITY, true)
            .with_capability(vendor.layout().rapl_capability, true)
    }

    pub fn with_feature_query(mut self, available: bool) -> Self {
        self.no_feature_query = !available;
        self
    }

    pub fn with_leaf(mut self, leaf: u32, outputs: Registers) -> Self {
        self.leaves.insert(leaf, outputs);
        self
    }

    /// Set or clear a single capability bit, leaving the rest of the leaf intact
    pub fn with_capability(mut self, capability: CapabilityBit, set: bool) -> Self {
        let outputs = self.leaves.entry(capability.leaf).or_default();
        let word = match capability.register {
            raplcal_raw::GpRegister::Eax => &mut outputs.eax,
            raplcal_raw::GpRegister::Ebx => &mut outputs.ebx,
            raplcal_raw::GpRegister::Ecx => &mut outputs.ecx,
            raplcal_raw::GpRegister::Edx => &mut outputs.edx,
        };
        if set {
            *word |= capability.mask();
        } else {
            *word &= !capability.mask();
        }
        self
    }

    /// A register that always reads the same 64-bit value
    pub fn with_register(mut self, address: u32, value: u64) -> Self {
        self.fixed.insert(address, Registers::from_msr_value(value));
        self
    }

    /// A register whose low 32 bits follow `values`, one per read
    pub fn with_sequence(self, address: u32, values: impl IntoIterator<Item = u32>) -> Self {
        self.sequences
            .lock()
            .insert(address, values.into_iter().collect());
        self
    }

    pub fn events(&self) -> Vec<AccessEvent> {
        self.events.lock().clone()
    }

    pub fn queried(&self, leaf: u32) -> bool {
        self.events.lock().contains(&AccessEvent::Query(leaf))
    }

    pub fn read_count(&self, address: u32) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| **e == AccessEvent::Read(address))
            .count()
    }

    /// Values left in the sequence of `address`
    pub fn remaining(&self, address: u32) -> usize {
        self.sequences
            .lock()
            .get(&address)
            .map_or(0, VecDeque::len)
    }
}

impl RegisterAccess for ScriptedAccess {
    fn has_feature_query(&self) -> bool {
        !self.no_feature_query
    }

    fn query_features(&self, leaf: u32) -> Registers {
        self.events.lock().push(AccessEvent::Query(leaf));
        self.leaves.get(&leaf).copied().unwrap_or_default()
    }

    fn read_register(&self, address: u32) -> Result<Registers> {
        self.events.lock().push(AccessEvent::Read(address));

        if let Some(values) = self.sequences.lock().get_mut(&address) {
            return values
                .pop_front()
                .map(|value| Registers::from_msr_value(u64::from(value)))
                .ok_or_else(|| {
                    RaplcalError::ScriptExhausted(format!("MSR 0x{address:X} sequence ended"))
                });
        }

        self.fixed.get(&address).copied().ok_or_else(|| {
            RaplcalError::ScriptExhausted(format!("no value scripted for MSR 0x{address:X}"))
        })
    }
}
