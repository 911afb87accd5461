//! Maps `Box<dyn Error>` from trait boundaries to typed `ChargerError`.
//!
//! `CellSampler` and `AlarmSink` return boxed errors so backends stay free of
//! core types; this module converts them, with an optional feature-gated
//! path for `charger_hardware::HwError` downcasting.

use crate::error::ChargerError;

/// Map a trait-boundary error to a typed `ChargerError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ChargerError {
    #[cfg(feature = "hardware-errors")]
    {
        use charger_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::ConversionTimeout => ChargerError::Timeout,
                other => ChargerError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        ChargerError::Timeout
    } else {
        ChargerError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_fall_back_to_message_heuristics() {
        let timeout = std::io::Error::other("ADC Timeout on sequence");
        assert_eq!(map_hw_error(&timeout), ChargerError::Timeout);

        let other = std::io::Error::other("bus glitch");
        assert_eq!(
            map_hw_error(&other),
            ChargerError::Hardware("bus glitch".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use charger_hardware::error::HwError;
        assert_eq!(
            map_hw_error(&HwError::ConversionTimeout),
            ChargerError::Timeout
        );
        assert!(matches!(
            map_hw_error(&HwError::ReplayExhausted(3)),
            ChargerError::HardwareFault(msg) if msg.contains("exhausted")
        ));
    }
}
