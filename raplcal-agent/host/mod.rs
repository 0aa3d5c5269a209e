pub mod attribute;

use std::sync::Arc;

pub use attribute::{page_size, Attribute, AttributeGroup};

use crate::common::{MonotonicClock, RegisterAccess};
use crate::metrics::rapl::Endpoint;
use crate::orchestrator::Calibrator;

/// Name of the object the report attributes live under
pub const OBJECT_NAME: &str = "rcal";

/// Create the `rcal` object with one attribute per report endpoint
pub fn register_calibrator<A, C>(calibrator: Arc<Calibrator<A, C>>) -> AttributeGroup
where
    A: RegisterAccess + 'static,
    C: MonotonicClock + 'static,
{
    let mut group = AttributeGroup::create(OBJECT_NAME);

    for endpoint in Endpoint::all() {
        let calibrator = Arc::clone(&calibrator);
        let attribute = match endpoint {
            Endpoint::Calibrate => Attribute::read_only(endpoint.attribute(), move |buf| {
                calibrator.calibrate().render_into(buf)
            }),
            Endpoint::Time => Attribute::read_only(endpoint.attribute(), move |buf| {
                calibrator.time().render_into(buf)
            }),
        };
        group.add(attribute);
    }

    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ScriptedAccess, SteppingClock};
    use crate::config::CalibrationConfig;
    use raplcal_raw::Vendor;

    #[test]
    fn test_attributes_render_reports() {
        let access = ScriptedAccess::supported(Vendor::Amd)
            .with_register(0xC001_0299, 0x0000_0A00)
            // second edge waits one repeated poll of 2 before moving to 3
            .with_sequence(0xC001_029B, [1, 2, 2, 2, 3, 3, 4]);
        let config = CalibrationConfig {
            vendor: Vendor::Amd,
            ..Default::default()
        };
        let calibrator =
            Arc::new(Calibrator::new(access, SteppingClock::new(0, 1_000), config).unwrap());
        let group = register_calibrator(Arc::clone(&calibrator));

        assert_eq!(group.name(), "rcal");
        assert_eq!(
            group.attribute_names().collect::<Vec<_>>(),
            vec!["rcal_calibrate", "rcal_time"]
        );
        assert_eq!(
            group.read("rcal_calibrate").as_deref(),
            Some("{\"units\": 10, \"start\": 2, \"end\": 3, \"count\": 1}\n")
        );
        assert_eq!(
            group.read("rcal_time").as_deref(),
            Some("{\"error\": \"Scripted register access exhausted: MSR 0xC001029B sequence ended\"}\n")
        );
    }
}
