//! Presence thresholds shared by all six cell taps.
//!
//! The taps are scaled so that 0x745 corresponds to a 3.0 V cell and 0x4D9 to
//! 2.0 V. Codes in between belong to the damaged band: something is wired to
//! the tap, but it is not a cell we are willing to charge.

use crate::error::ChargerError;
use crate::sample::{MAX_RAW_CODE, RawSample};

/// Below this code nothing is connected at (or beyond) a tap.
pub const PRESENT_LOW: u16 = charger_config::DEFAULT_PRESENT_LOW;
/// At or above this code a healthy cell is connected.
pub const PRESENT_HIGH: u16 = charger_config::DEFAULT_PRESENT_HIGH;

/// How a single tap reads against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellBand {
    /// `code < present_low`
    Absent,
    /// `present_low <= code < present_high`
    Damaged,
    /// `code >= present_high`
    Healthy,
}

impl CellBand {
    pub fn name(self) -> &'static str {
        match self {
            CellBand::Absent => "absent",
            CellBand::Damaged => "damaged",
            CellBand::Healthy => "healthy",
        }
    }
}

/// Validated threshold pair; `present_low < present_high` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageThresholds {
    present_low: u16,
    present_high: u16,
}

impl Default for VoltageThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl VoltageThresholds {
    pub const DEFAULT: Self = Self {
        present_low: PRESENT_LOW,
        present_high: PRESENT_HIGH,
    };

    pub fn new(present_low: u16, present_high: u16) -> Result<Self, ChargerError> {
        if present_low > MAX_RAW_CODE || present_high > MAX_RAW_CODE {
            return Err(ChargerError::Config(format!(
                "thresholds must be 12-bit codes, got {present_low:#05x}/{present_high:#05x}"
            )));
        }
        if present_low >= present_high {
            return Err(ChargerError::Config(format!(
                "present_low {present_low:#05x} must be below present_high {present_high:#05x}"
            )));
        }
        Ok(Self {
            present_low,
            present_high,
        })
    }

    #[inline]
    pub const fn present_low(&self) -> u16 {
        self.present_low
    }

    #[inline]
    pub const fn present_high(&self) -> u16 {
        self.present_high
    }

    #[inline]
    pub fn band(&self, sample: RawSample) -> CellBand {
        let code = sample.code();
        if code < self.present_low {
            CellBand::Absent
        } else if code < self.present_high {
            CellBand::Damaged
        } else {
            CellBand::Healthy
        }
    }
}
