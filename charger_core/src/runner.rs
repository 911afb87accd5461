//! The sampling cycle: ingest, classify, rank, hand off to alarms.
//!
//! Strictly single threaded. Each cycle finishes all four stages before the
//! next one starts; the only blocking point is the sampler's conversion wait.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use charger_traits::CellSampler;
use charger_traits::clock::{Clock, MonotonicClock};
use tracing::{debug, info, warn};

use crate::alarms::{AlarmSink, SettableAlarms};
use crate::error::{BuildError, ChargerError, Result};
use crate::hw_error::map_hw_error;
use crate::rank::{RankScope, rank_cells};
use crate::sample::SampleFrame;
use crate::status::{CycleReport, RunSummary};
use crate::thresholds::VoltageThresholds;

const DEFAULT_SAMPLE_TIMEOUT: Duration = Duration::from_millis(50);
const DEFAULT_CYCLE_RATE_HZ: u32 = 10;

fn saturating_u64(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

pub struct CycleRunner {
    sampler: Box<dyn CellSampler>,
    alarms: Box<dyn AlarmSink>,
    thresholds: VoltageThresholds,
    scope: RankScope,
    clock: Arc<dyn Clock + Send + Sync>,
    sample_timeout: Duration,
    period: Duration,
    cycle: u64,
}

impl core::fmt::Debug for CycleRunner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CycleRunner")
            .field("thresholds", &self.thresholds)
            .field("scope", &self.scope)
            .field("sample_timeout", &self.sample_timeout)
            .field("period", &self.period)
            .field("cycle", &self.cycle)
            .finish()
    }
}

impl CycleRunner {
    pub fn builder() -> CycleRunnerBuilder {
        CycleRunnerBuilder::default()
    }

    pub fn thresholds(&self) -> VoltageThresholds {
        self.thresholds
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Cycles completed so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Run exactly one sampling cycle.
    pub fn step(&mut self) -> Result<CycleReport> {
        let seq = self
            .sampler
            .read_frame(self.sample_timeout)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
        let frame = SampleFrame::from_sequence(&seq)
            .map_err(|e| eyre::Report::new(ChargerError::Sample(e)))?;

        let classification = self.thresholds.classify(frame.cells());
        let ranked = rank_cells(&frame, classification, self.scope);
        // Committed to `self.cycle` only once the alarm stage accepts the report.
        let cycle = self.cycle.saturating_add(1);

        let report = CycleReport {
            cycle,
            frame,
            classification,
            ranked,
        };

        if classification.fault {
            let bands = self.thresholds.bands(frame.cells()).map(|b| b.name());
            warn!(
                cycle,
                cells = classification.cell_count,
                ?bands,
                "ambiguous cell state"
            );
        } else if classification.is_disconnected() {
            debug!(cycle, "no pack on the cell taps");
        } else {
            debug!(
                cycle,
                cells = classification.cell_count,
                usable = classification.is_usable(),
                spread = ranked.spread(),
                ranked = ?ranked.as_slice(),
                "cycle classified"
            );
        }

        self.alarms
            .evaluate(&report)
            .map_err(|e| eyre::Report::new(ChargerError::Alarm(e.to_string())))?;
        self.cycle = cycle;
        Ok(report)
    }

    /// Run cycles until `max_cycles` have completed (0 = no limit) or `shutdown` is set.
    ///
    /// Each cycle starts one period after the previous one started; an overrun
    /// cycle is followed immediately by the next without trying to catch up.
    /// Errors from ingestion or alarms end the run.
    pub fn run(
        &mut self,
        max_cycles: u64,
        shutdown: &AtomicBool,
        mut on_cycle: impl FnMut(&CycleReport),
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        info!(
            max_cycles,
            period_ms = saturating_u64(self.period.as_millis()),
            present_low = self.thresholds.present_low(),
            present_high = self.thresholds.present_high(),
            "charger run start"
        );

        let mut next_start = self.clock.now();
        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!(cycles = summary.cycles, "shutdown requested");
                break;
            }
            if max_cycles != 0 && summary.cycles >= max_cycles {
                break;
            }
            self.clock.sleep_until(next_start);
            let started = self.clock.now();

            let report = self.step()?;
            let took = self.clock.now().saturating_duration_since(started);
            if crate::util::is_late(took, self.period) {
                debug!(
                    cycle = report.cycle,
                    took_us = saturating_u64(took.as_micros()),
                    "cycle overran its period"
                );
            }
            summary.record(&report);
            on_cycle(&report);

            next_start = started + self.period;
        }

        info!(
            cycles = summary.cycles,
            faulted = summary.faulted_cycles,
            "charger run finished"
        );
        Ok(summary)
    }
}

/// Builder for `CycleRunner`. Everything except the sampler has a default.
#[derive(Default)]
pub struct CycleRunnerBuilder {
    sampler: Option<Box<dyn CellSampler>>,
    alarms: Option<Box<dyn AlarmSink>>,
    thresholds: Option<VoltageThresholds>,
    scope: Option<RankScope>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    sample_timeout: Option<Duration>,
    cycle_rate_hz: Option<u32>,
}

impl CycleRunnerBuilder {
    pub fn with_sampler(mut self, sampler: impl CellSampler + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    pub fn with_alarms(mut self, alarms: impl AlarmSink + 'static) -> Self {
        self.alarms = Some(Box::new(alarms));
        self
    }

    pub fn with_thresholds(mut self, thresholds: VoltageThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_rank_scope(mut self, scope: RankScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_sample_timeout(mut self, timeout: Duration) -> Self {
        self.sample_timeout = Some(timeout);
        self
    }

    pub fn with_cycle_rate_hz(mut self, hz: u32) -> Self {
        self.cycle_rate_hz = Some(hz);
        self
    }

    /// Take thresholds, rank scope, cycle rate and sample timeout from a loaded config.
    pub fn apply_config(self, cfg: &charger_config::Config) -> Result<Self> {
        let thresholds = VoltageThresholds::try_from(&cfg.thresholds).map_err(eyre::Report::new)?;
        Ok(self
            .with_thresholds(thresholds)
            .with_rank_scope(cfg.sampling.rank_scope.into())
            .with_cycle_rate_hz(cfg.sampling.cycle_rate_hz)
            .with_sample_timeout(Duration::from_millis(cfg.timeouts.sample_ms)))
    }

    pub fn build(self) -> Result<CycleRunner> {
        let sampler = self
            .sampler
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSampler))?;
        let hz = self.cycle_rate_hz.unwrap_or(DEFAULT_CYCLE_RATE_HZ);
        if hz == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "cycle_rate_hz must be > 0",
            )));
        }
        let sample_timeout = self.sample_timeout.unwrap_or(DEFAULT_SAMPLE_TIMEOUT);
        if sample_timeout.is_zero() {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "sample timeout must be > 0",
            )));
        }

        Ok(CycleRunner {
            sampler,
            alarms: self.alarms.unwrap_or_else(|| Box::new(SettableAlarms)),
            thresholds: self.thresholds.unwrap_or_default(),
            scope: self.scope.unwrap_or_default(),
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(MonotonicClock::new())),
            sample_timeout,
            period: crate::util::cycle_period(hz),
            cycle: 0,
        })
    }
}
