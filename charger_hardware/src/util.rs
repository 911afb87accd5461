use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Poll `is_ready` until it reports a finished conversion or `timeout` expires.
/// Sleeps `poll_interval` between polls instead of spinning.
pub fn wait_for_conversion(
    mut is_ready: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while !is_ready() {
        if Instant::now() >= deadline {
            return Err(HwError::ConversionTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}
