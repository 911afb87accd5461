//! Test and helper mocks for charger_core.

use crate::alarms::AlarmSink;
use crate::status::CycleReport;
use std::sync::{Arc, Mutex};

/// Alarm sink that keeps a copy of every report it was shown.
///
/// Clones share storage, so a test can hand one clone to the runner and
/// inspect the other afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingAlarms {
    seen: Arc<Mutex<Vec<CycleReport>>>,
}

impl RecordingAlarms {
    pub fn reports(&self) -> Vec<CycleReport> {
        self.seen.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl AlarmSink for RecordingAlarms {
    fn evaluate(
        &mut self,
        report: &CycleReport,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.seen
            .lock()
            .map_err(|_| "recording alarms poisoned")?
            .push(*report);
        Ok(())
    }
}
