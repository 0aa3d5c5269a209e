// Calibration report assembler
// START -> FEATURE_CHECK -> {ERROR | PROCEED} -> SYNCHRONIZED_SAMPLING -> REPORT

use crate::common::{AffinityGuard, MonotonicClock, RegisterAccess};
use crate::config::CalibrationConfig;
use crate::counters::rapl::{CounterSynchronizer, FeatureDetector, RaplMonitor};
use crate::error::Result;
use crate::metrics::rapl::{
    CalibrationReport, CalibrationSample, Report, TimingReport, TimingSample,
};
use crate::prom::CalibrationMetrics;

/// Produces calibration and timing reports, one independent traversal per read
///
/// No state is carried between reads other than the metrics counters, so
/// concurrent readers never observe each other's samples.
pub struct Calibrator<A: RegisterAccess, C: MonotonicClock> {
    access: A,
    clock: C,
    config: CalibrationConfig,
    pin: bool,
    metrics: CalibrationMetrics,
}

impl<A: RegisterAccess, C: MonotonicClock> Calibrator<A, C> {
    pub fn new(access: A, clock: C, config: CalibrationConfig) -> Result<Self> {
        Ok(Self {
            access,
            clock,
            config,
            pin: false,
            metrics: CalibrationMetrics::new()?,
        })
    }

    /// Pin the calling thread to `config.cpu` for the duration of each report
    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn metrics(&self) -> &CalibrationMetrics {
        &self.metrics
    }

    pub fn calibrate(&self) -> CalibrationReport {
        let report = Report::settle(self.try_calibrate());
        self.metrics.observe_calibration(&report);
        report
    }

    pub fn time(&self) -> TimingReport {
        let report = Report::settle(self.try_time());
        self.metrics.observe_timing(&report);
        report
    }

    fn affinity(&self) -> Result<Option<AffinityGuard>> {
        if self.pin {
            AffinityGuard::new(self.config.cpu).map(Some)
        } else {
            Ok(None)
        }
    }

    fn try_calibrate(&self) -> Result<CalibrationSample> {
        let _affinity = self.affinity()?;
        let layout = self.config.layout();

        FeatureDetector::new(&self.access, layout).check()?;

        let monitor = RaplMonitor::new(&self.access, layout);
        let units = monitor.energy_units()?;

        let sync = CounterSynchronizer::new(&monitor, self.config.sync_limit);
        let start = sync.synchronize()?;
        let end = sync.synchronize_counted()?;

        let sample = CalibrationSample {
            units,
            start,
            end: end.value,
            count: end.polls,
        };
        tracing::debug!("Calibration sample: {:?}", sample);
        Ok(sample)
    }

    fn try_time(&self) -> Result<TimingSample> {
        let _affinity = self.affinity()?;
        let layout = self.config.layout();

        FeatureDetector::new(&self.access, layout).check()?;

        let monitor = RaplMonitor::new(&self.access, layout);
        let sync = CounterSynchronizer::new(&monitor, self.config.sync_limit);

        sync.synchronize()?;
        let start = self.clock.now_ns()?;
        sync.synchronize()?;
        let end = self.clock.now_ns()?;

        let sample = TimingSample { start, end };
        tracing::debug!("Tick period: {} ns", sample.tick_period_ns());
        Ok(sample)
    }
}
