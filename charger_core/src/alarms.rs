//! Boundary to the user-settable alarm stage.
//!
//! Alarm policy (timers, thermal cutoff, user thresholds) lives outside this
//! crate. The runner calls the sink once per cycle, after classification and
//! ranking, with a shared reference to the cycle's report.

use crate::status::CycleReport;

pub trait AlarmSink {
    fn evaluate(
        &mut self,
        report: &CycleReport,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<A: AlarmSink + ?Sized> AlarmSink for Box<A> {
    fn evaluate(
        &mut self,
        report: &CycleReport,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).evaluate(report)
    }
}

/// Placeholder alarm stage: accepts every cycle without acting on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettableAlarms;

impl AlarmSink for SettableAlarms {
    fn evaluate(
        &mut self,
        report: &CycleReport,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!(cycle = report.cycle, "settable alarms: no alarms configured");
        Ok(())
    }
}
