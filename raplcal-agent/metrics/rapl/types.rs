use serde::{Deserialize, Serialize};

metric_enum! {
    pub enum CalibrationMetric {
        ReportsTotal => "raplcal_reports_total",
        LastEnergyUnits => "raplcal_last_energy_units",
        LastPollCount => "raplcal_last_poll_count",
        LastTickEnergy => "raplcal_last_tick_energy_nanojoules",
        LastCountEnergy => "raplcal_last_count_energy_nanojoules",
        LastTickPeriod => "raplcal_last_tick_period_ns",
    }
}

enum_with_data! {
    /// The read-only report endpoints and the attribute file backing each
    pub enum Endpoint: &'static str {
        Calibrate => ("calibrate", "rcal_calibrate"),
        Time => ("time", "rcal_time"),
    }
    impl attribute -> &'static str
}

metric_enum! {
    pub enum Outcome {
        Ok => "ok",
        Unsupported => "unsupported",
        Timeout => "timeout",
        Fault => "fault",
    }
}

/// Energy counter 32-bit modulus
const COUNTER_WRAP: u64 = 1 << 32;

/// Result of one calibration read: two edge-aligned samples one tick apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Energy unit exponent, one tick is `2^-units` joules
    pub units: u32,
    pub start: u32,
    pub end: u32,
    /// Polls spent waiting between the two edges
    pub count: u64,
}

impl CalibrationSample {
    /// Ticks between `start` and `end`, assuming at most one wraparound
    pub fn delta_ticks(&self) -> u64 {
        (u64::from(self.end) + COUNTER_WRAP - u64::from(self.start)) % COUNTER_WRAP
    }

    pub fn joules_per_tick(&self) -> f64 {
        0.5_f64.powi(self.units as i32)
    }

    pub fn energy_nanojoules(&self) -> f64 {
        self.delta_ticks() as f64 * self.joules_per_tick() * 1e9
    }

    /// Energy attributed to a single poll, `None` if no poll was counted
    pub fn nanojoules_per_count(&self) -> Option<f64> {
        (self.count > 0).then(|| self.energy_nanojoules() / self.count as f64)
    }
}

/// Monotonic timestamps of two consecutive counter edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSample {
    pub start: u64,
    pub end: u64,
}

impl TimingSample {
    /// Duration of one counter update period
    pub fn tick_period_ns(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(start: u32, end: u32, units: u32, count: u64) -> CalibrationSample {
        CalibrationSample {
            units,
            start,
            end,
            count,
        }
    }

    #[test]
    fn test_delta_handles_wraparound() {
        assert_eq!(sample(7, 9, 0, 1).delta_ticks(), 2);
        assert_eq!(sample(u32::MAX, 1, 0, 1).delta_ticks(), 2);
        assert_eq!(sample(5, 5, 0, 1).delta_ticks(), 0);
    }

    #[test]
    fn test_energy_conversion() {
        // 2^-10 J per tick, 4 ticks
        let s = sample(100, 104, 10, 8);
        assert_eq!(s.joules_per_tick(), 1.0 / 1024.0);
        assert!((s.energy_nanojoules() - 3_906_250.0).abs() < 1e-6);
        assert!((s.nanojoules_per_count().unwrap() - 488_281.25).abs() < 1e-6);
        assert_eq!(sample(1, 2, 10, 0).nanojoules_per_count(), None);
    }

    #[test]
    fn test_endpoint_attribute_names() {
        assert_eq!(Endpoint::Calibrate.attribute(), "rcal_calibrate");
        assert_eq!(Endpoint::Time.name(), "time");
        assert_eq!(Endpoint::all().len(), 2);
    }

    #[test]
    fn test_tick_period() {
        let t = TimingSample {
            start: 1_000,
            end: 1_977,
        };
        assert_eq!(t.tick_period_ns(), 977);
    }
}
