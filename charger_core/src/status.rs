//! Per-cycle snapshot and run totals.

use crate::classify::ClassificationResult;
use crate::rank::RankedCells;
use crate::sample::SampleFrame;

/// Everything one sampling cycle produced. Handed out by shared reference only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based cycle number within the runner's lifetime.
    pub cycle: u64,
    pub frame: SampleFrame,
    pub classification: ClassificationResult,
    pub ranked: RankedCells,
}

/// Totals for a finished (or interrupted) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub faulted_cycles: u64,
    pub last: Option<ClassificationResult>,
}

impl RunSummary {
    pub(crate) fn record(&mut self, report: &CycleReport) {
        self.cycles = self.cycles.saturating_add(1);
        if report.classification.fault {
            self.faulted_cycles = self.faulted_cycles.saturating_add(1);
        }
        self.last = Some(report.classification);
    }
}
