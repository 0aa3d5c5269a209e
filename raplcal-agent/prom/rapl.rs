use prometheus::{Gauge, IntCounterVec, IntGauge, Opts, Registry};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::metrics::rapl::{CalibrationMetric, CalibrationReport, Endpoint, TimingReport};

/// Prometheus view of the reports served so far
///
/// Updated after each read; nothing is sampled in the background.
pub struct CalibrationMetrics {
    registry: Arc<Registry>,
    reports: IntCounterVec,
    int_gauges: HashMap<CalibrationMetric, IntGauge>,
    gauges: HashMap<CalibrationMetric, Gauge>,
}

impl CalibrationMetrics {
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let reports = IntCounterVec::new(
            Opts::new(
                CalibrationMetric::ReportsTotal.name(),
                "Reports served, by endpoint and outcome",
            ),
            &["endpoint", "outcome"],
        )?;
        registry.register(Box::new(reports.clone()))?;

        let mut int_gauges = HashMap::new();
        for (metric, help) in [
            (CalibrationMetric::LastEnergyUnits, "Energy unit exponent of the last calibration"),
            (CalibrationMetric::LastPollCount, "Polls between the two edges of the last calibration"),
            (CalibrationMetric::LastTickPeriod, "Duration of the last timed counter tick"),
        ] {
            let gauge = IntGauge::with_opts(Opts::new(metric.name(), help))?;
            registry.register(Box::new(gauge.clone()))?;
            int_gauges.insert(metric, gauge);
        }

        let mut gauges = HashMap::new();
        for (metric, help) in [
            (CalibrationMetric::LastTickEnergy, "Energy between the two edges of the last calibration"),
            (CalibrationMetric::LastCountEnergy, "Energy per counted poll of the last calibration"),
        ] {
            let gauge = Gauge::with_opts(Opts::new(metric.name(), help))?;
            registry.register(Box::new(gauge.clone()))?;
            gauges.insert(metric, gauge);
        }

        Ok(Self {
            registry,
            reports,
            int_gauges,
            gauges,
        })
    }

    fn set(&self, metric: CalibrationMetric, value: i64) {
        if let Some(gauge) = self.int_gauges.get(&metric) {
            gauge.set(value);
        }
    }

    fn count(&self, endpoint: Endpoint, outcome: &str) {
        self.reports
            .with_label_values(&[endpoint.name(), outcome])
            .inc();
    }

    pub fn observe_calibration(&self, report: &CalibrationReport) {
        self.count(Endpoint::Calibrate, report.outcome().name());
        if let Some(sample) = report.ready() {
            self.set(CalibrationMetric::LastEnergyUnits, i64::from(sample.units));
            self.set(
                CalibrationMetric::LastPollCount,
                i64::try_from(sample.count).unwrap_or(i64::MAX),
            );
            if let Some(gauge) = self.gauges.get(&CalibrationMetric::LastTickEnergy) {
                gauge.set(sample.energy_nanojoules());
            }
            // no counted poll leaves the previous value in place
            if let (Some(gauge), Some(per_count)) = (
                self.gauges.get(&CalibrationMetric::LastCountEnergy),
                sample.nanojoules_per_count(),
            ) {
                gauge.set(per_count);
            }
        }
    }

    pub fn observe_timing(&self, report: &TimingReport) {
        self.count(Endpoint::Time, report.outcome().name());
        if let Some(sample) = report.ready() {
            self.set(
                CalibrationMetric::LastTickPeriod,
                i64::try_from(sample.tick_period_ns()).unwrap_or(i64::MAX),
            );
        }
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalibrationFailure;
    use crate::metrics::rapl::{CalibrationSample, Report, TimingSample};

    #[test]
    fn test_observations_update_registry() {
        let metrics = CalibrationMetrics::new().unwrap();

        metrics.observe_calibration(&Report::Ready(CalibrationSample {
            units: 10,
            start: 7,
            end: 9,
            count: 2,
        }));
        metrics.observe_calibration(&Report::Failed {
            error: CalibrationFailure::UnsupportedEnergyAccounting,
        });
        metrics.observe_timing(&Report::Ready(TimingSample { start: 10, end: 1_010 }));

        assert_eq!(
            metrics
                .reports
                .with_label_values(&["calibrate", "ok"])
                .get(),
            1
        );
        assert_eq!(
            metrics
                .reports
                .with_label_values(&["calibrate", "unsupported"])
                .get(),
            1
        );
        assert_eq!(metrics.int_gauges[&CalibrationMetric::LastEnergyUnits].get(), 10);
        assert_eq!(metrics.int_gauges[&CalibrationMetric::LastPollCount].get(), 2);
        assert_eq!(metrics.int_gauges[&CalibrationMetric::LastTickPeriod].get(), 1_000);
        // 2 ticks of 2^-10 J over 2 polls
        assert_eq!(metrics.gauges[&CalibrationMetric::LastCountEnergy].get(), 976_562.5);

        let names: Vec<String> = metrics
            .registry()
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"raplcal_reports_total".to_string()));
        assert!(names.contains(&"raplcal_last_tick_energy_nanojoules".to_string()));
        assert!(names.contains(&"raplcal_last_count_energy_nanojoules".to_string()));
    }

    #[test]
    fn test_zero_count_keeps_previous_count_energy() {
        let metrics = CalibrationMetrics::new().unwrap();
        let ready = |count| {
            Report::Ready(CalibrationSample {
                units: 0,
                start: 1,
                end: 5,
                count,
            })
        };

        metrics.observe_calibration(&ready(4));
        metrics.observe_calibration(&ready(0));
        assert_eq!(metrics.gauges[&CalibrationMetric::LastCountEnergy].get(), 1e9);
        assert_eq!(metrics.int_gauges[&CalibrationMetric::LastPollCount].get(), 0);
    }
}
