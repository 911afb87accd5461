//! Cycle timing helpers shared by the runner and the CLI stats.

use std::time::Duration;

const MICROS_PER_SEC: u64 = 1_000_000;

/// Slack allowed past the period before a cycle counts as late: period / 10.
const LATE_SLACK_DIVISOR: u32 = 10;

/// Cycle period for a rate in Hz. `hz = 0` is treated as 1 Hz; the result
/// never drops below 1 µs.
#[inline]
pub fn cycle_period(hz: u32) -> Duration {
    Duration::from_micros((MICROS_PER_SEC / u64::from(hz.max(1))).max(1))
}

/// Longest gap between cycle starts that still counts as on time.
#[inline]
pub fn late_after(period: Duration) -> Duration {
    period + period / LATE_SLACK_DIVISOR
}

#[inline]
pub fn is_late(interval: Duration, period: Duration) -> bool {
    interval > late_after(period)
}
