//! CPU capability gates evaluated before any RAPL register is touched

use raplcal_raw::{CapabilityBit, VendorLayout, MSR_CAPABILITY};

use crate::common::RegisterAccess;
use crate::error::{CalibrationFailure, Result};

/// Answers the three capability questions from fresh CPUID outputs
///
/// Nothing is cached: every call issues its own feature query.
pub struct FeatureDetector<'a, A: RegisterAccess> {
    access: &'a A,
    layout: VendorLayout,
}

impl<'a, A: RegisterAccess> FeatureDetector<'a, A> {
    pub fn new(access: &'a A, layout: VendorLayout) -> Self {
        Self { access, layout }
    }

    /// The feature-query instruction itself is available
    pub fn cpuid_ok(&self) -> bool {
        self.access.has_feature_query()
    }

    /// `rdmsr` is supported (`CPUID.01H:EDX[5]`)
    pub fn msr_read_ok(&self) -> bool {
        self.test(MSR_CAPABILITY)
    }

    /// The vendor's energy accounting flag is set
    pub fn rapl_ok(&self) -> bool {
        self.test(self.layout.rapl_capability)
    }

    fn test(&self, capability: CapabilityBit) -> bool {
        let outputs = self.access.query_features(capability.leaf);
        let set = capability.is_set(&outputs);
        tracing::debug!(
            "CPUID 0x{:08x} {}[{}] = {}",
            capability.leaf,
            capability.register.name(),
            capability.bit,
            set
        );
        set
    }

    /// Run the gates in order, stopping at the first one that fails
    pub fn check(&self) -> Result<()> {
        if !self.cpuid_ok() {
            return Err(CalibrationFailure::UnsupportedFeatureQuery.into());
        }
        if !self.msr_read_ok() {
            return Err(CalibrationFailure::UnsupportedRegisterRead.into());
        }
        if !self.rapl_ok() {
            return Err(CalibrationFailure::UnsupportedEnergyAccounting.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ScriptedAccess;
    use crate::error::RaplcalError;
    use raplcal_raw::{Registers, Vendor};

    const APM_LEAF: u32 = 0x8000_0007;

    fn failure(result: Result<()>) -> Option<CalibrationFailure> {
        match result {
            Ok(()) => None,
            Err(RaplcalError::Calibration(f)) => Some(f),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_each_gate_follows_only_its_bit() {
        let layout = Vendor::Amd.layout();

        let all = ScriptedAccess::supported(Vendor::Amd);
        let detector = FeatureDetector::new(&all, layout);
        assert!(detector.cpuid_ok() && detector.msr_read_ok() && detector.rapl_ok());

        let no_msr = ScriptedAccess::supported(Vendor::Amd).with_capability(MSR_CAPABILITY, false);
        let detector = FeatureDetector::new(&no_msr, layout);
        assert!(detector.cpuid_ok());
        assert!(!detector.msr_read_ok());
        assert!(detector.rapl_ok());

        let no_rapl = ScriptedAccess::supported(Vendor::Amd)
            .with_capability(layout.rapl_capability, false);
        let detector = FeatureDetector::new(&no_rapl, layout);
        assert!(detector.cpuid_ok());
        assert!(detector.msr_read_ok());
        assert!(!detector.rapl_ok());

        let no_cpuid = ScriptedAccess::supported(Vendor::Amd).with_feature_query(false);
        let detector = FeatureDetector::new(&no_cpuid, layout);
        assert!(!detector.cpuid_ok());
        assert!(detector.msr_read_ok());
        assert!(detector.rapl_ok());
    }

    #[test]
    fn test_neighbouring_bits_do_not_count() {
        // bits 5 and 12 of the APM leaf, but not 14
        let access = ScriptedAccess::supported(Vendor::Amd)
            .with_leaf(APM_LEAF, Registers::new(0, 0, 0, (1 << 5) | (1 << 12)));
        let detector = FeatureDetector::new(&access, Vendor::Amd.layout());
        assert!(!detector.rapl_ok());
    }

    #[test]
    fn test_rapl_gate_skipped_when_msr_unsupported() {
        let access = ScriptedAccess::supported(Vendor::Amd).with_capability(MSR_CAPABILITY, false);
        let detector = FeatureDetector::new(&access, Vendor::Amd.layout());

        assert_eq!(
            failure(detector.check()),
            Some(CalibrationFailure::UnsupportedRegisterRead)
        );
        assert!(access.queried(1));
        assert!(!access.queried(APM_LEAF));
    }

    #[test]
    fn test_check_order() {
        let layout = Vendor::Amd.layout();

        let access = ScriptedAccess::new().with_feature_query(false);
        assert_eq!(
            failure(FeatureDetector::new(&access, layout).check()),
            Some(CalibrationFailure::UnsupportedFeatureQuery)
        );
        assert!(access.events().is_empty());

        let access = ScriptedAccess::new().with_capability(MSR_CAPABILITY, true);
        assert_eq!(
            failure(FeatureDetector::new(&access, layout).check()),
            Some(CalibrationFailure::UnsupportedEnergyAccounting)
        );

        let access = ScriptedAccess::supported(Vendor::Amd);
        assert_eq!(failure(FeatureDetector::new(&access, layout).check()), None);
    }

    #[test]
    fn test_flags_are_not_cached() {
        let access = ScriptedAccess::supported(Vendor::Amd);
        let detector = FeatureDetector::new(&access, Vendor::Amd.layout());
        detector.msr_read_ok();
        detector.msr_read_ok();
        let queries = access
            .events()
            .into_iter()
            .filter(|e| *e == crate::common::AccessEvent::Query(1))
            .count();
        assert_eq!(queries, 2);
    }

    #[test]
    fn test_intel_capability_lives_in_eax() {
        let access = ScriptedAccess::supported(Vendor::Intel);
        let detector = FeatureDetector::new(&access, Vendor::Intel.layout());
        assert!(detector.rapl_ok());
        assert!(!FeatureDetector::new(&access, Vendor::Amd.layout()).rapl_ok());
    }
}
