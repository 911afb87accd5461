//! Cell population classification.
//!
//! A series stack is populated from tap 0 upward, so the cell count is the
//! length of the leading run of healthy taps. Everything past that run must
//! read absent for the result to be clean; anything else (a damaged-band tap,
//! or a healthy tap after a gap) is reported as a fault with the prefix count
//! kept as a best-effort answer.

use crate::sample::{CELL_COUNT, RawSample};
use crate::thresholds::{CellBand, VoltageThresholds};

/// Outcome of one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ClassificationResult {
    /// Populated cells, always in `0..=6`.
    pub cell_count: u8,
    pub fault: bool,
}

impl ClassificationResult {
    pub const DISCONNECTED: Self = Self {
        cell_count: 0,
        fault: false,
    };

    /// No pack on the taps at all.
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        *self == Self::DISCONNECTED
    }

    /// At least one cell and nothing ambiguous: safe to hand to charge control.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.cell_count > 0 && !self.fault
    }
}

impl VoltageThresholds {
    /// Classify six cell taps. Total: every input maps to a defined result.
    pub fn classify(&self, samples: [RawSample; CELL_COUNT]) -> ClassificationResult {
        let bands = self.bands(samples);

        if bands.iter().all(|b| *b == CellBand::Absent) {
            return ClassificationResult::DISCONNECTED;
        }
        if !bands.contains(&CellBand::Healthy) {
            // Pack is on the taps but no tap reaches a usable voltage.
            return ClassificationResult {
                cell_count: 0,
                fault: true,
            };
        }

        let count = bands
            .iter()
            .take_while(|b| **b == CellBand::Healthy)
            .count()
            .min(CELL_COUNT);
        let fault = bands[count..].iter().any(|b| *b != CellBand::Absent);

        ClassificationResult {
            cell_count: u8::try_from(count).unwrap_or(u8::MAX),
            fault,
        }
    }

    /// Per-tap bands, in physical order.
    pub fn bands(&self, samples: [RawSample; CELL_COUNT]) -> [CellBand; CELL_COUNT] {
        samples.map(|s| self.band(s))
    }
}

/// Classify with the default thresholds.
#[inline]
pub fn classify(samples: [RawSample; CELL_COUNT]) -> ClassificationResult {
    VoltageThresholds::DEFAULT.classify(samples)
}
