//! Ingestion backends for the charger controller.
//!
//! The physical converter front-end is owned by the board support code; this
//! crate provides the in-process stand-ins the controller runs against:
//! a configurable simulator and a replay of recorded conversion sequences.

pub mod error;
pub mod util;

use std::time::{Duration, Instant};

use charger_traits::{CellSampler, FRAME_SLOTS, MAX_RAW_CODE};
use tracing::trace;

use crate::error::HwError;

const CELL_SLOT_OFFSET: usize = slot::CELL0;
const CELL_TAPS: usize = 6;

/// Slot order of a conversion sequence.
pub mod slot {
    pub const PACK_SENSE: usize = 0;
    pub const CELL0: usize = 1;
    pub const PACK_CURRENT: usize = 7;
    pub const THERMOCOUPLE1: usize = 8;
    pub const THERMOCOUPLE2: usize = 9;
}

/// Idle current draw and room-temperature thermocouple readings.
const SIM_CURRENT_CODE: u16 = 0x010;
const SIM_THERMO_CODE: u16 = 0x300;

/// Simulated pack: a fixed frame plus optional ripple and conversion latency.
#[derive(Debug, Clone)]
pub struct SimulatedCellTaps {
    frame: [u16; FRAME_SLOTS],
    ripple: u16,
    conversion_time: Duration,
    reads: u64,
}

impl Default for SimulatedCellTaps {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCellTaps {
    /// Disconnected pack: every slot reads zero.
    pub fn new() -> Self {
        Self {
            frame: [0; FRAME_SLOTS],
            ripple: 0,
            conversion_time: Duration::ZERO,
            reads: 0,
        }
    }

    /// Pack with `cells` healthy cells (capped at six) reading `code` each.
    pub fn with_pack(cells: usize, code: u16) -> Self {
        let code = code.min(MAX_RAW_CODE);
        let mut frame = [0u16; FRAME_SLOTS];
        for tap in frame.iter_mut().skip(CELL_SLOT_OFFSET).take(cells.min(CELL_TAPS)) {
            *tap = code;
        }
        if cells > 0 {
            frame[slot::PACK_SENSE] = code;
        }
        frame[slot::PACK_CURRENT] = SIM_CURRENT_CODE;
        frame[slot::THERMOCOUPLE1] = SIM_THERMO_CODE;
        frame[slot::THERMOCOUPLE2] = SIM_THERMO_CODE;
        Self {
            frame,
            ..Self::new()
        }
    }

    /// Override one cell tap (0-based cell index); out-of-range indices are ignored.
    pub fn with_cell(mut self, cell: usize, code: u16) -> Self {
        if cell < CELL_TAPS {
            self.frame[CELL_SLOT_OFFSET + cell] = code.min(MAX_RAW_CODE);
        }
        self
    }

    /// Add a deterministic triangle ripple of +/- `amplitude` codes to nonzero cell taps.
    pub fn with_ripple(mut self, amplitude: u16) -> Self {
        self.ripple = amplitude;
        self
    }

    /// Time the simulated sequencer needs before results are ready.
    pub fn with_conversion_time(mut self, d: Duration) -> Self {
        self.conversion_time = d;
        self
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    fn rippled(&self, code: u16) -> u16 {
        if self.ripple == 0 || code == 0 {
            return code;
        }
        match self.reads % 3 {
            0 => code.saturating_sub(self.ripple),
            1 => code,
            _ => code.saturating_add(self.ripple).min(MAX_RAW_CODE),
        }
    }
}

impl CellSampler for SimulatedCellTaps {
    fn read_frame(
        &mut self,
        timeout: Duration,
    ) -> Result<[u16; FRAME_SLOTS], Box<dyn std::error::Error + Send + Sync>> {
        if !self.conversion_time.is_zero() {
            let ready_at = Instant::now() + self.conversion_time;
            util::wait_for_conversion(
                || Instant::now() >= ready_at,
                timeout,
                Duration::from_micros(200),
            )?;
        }
        let mut out = self.frame;
        for tap in out.iter_mut().skip(CELL_SLOT_OFFSET).take(CELL_TAPS) {
            *tap = self.rippled(*tap);
        }
        self.reads = self.reads.saturating_add(1);
        trace!(reads = self.reads, ?out, "simulated frame");
        Ok(out)
    }
}

/// Plays back recorded frames in order.
#[derive(Debug, Clone)]
pub struct ReplayCellTaps {
    frames: Vec<[u16; FRAME_SLOTS]>,
    next: usize,
    looping: bool,
}

impl ReplayCellTaps {
    pub fn new(frames: Vec<[u16; FRAME_SLOTS]>) -> Self {
        Self {
            frames,
            next: 0,
            looping: false,
        }
    }

    /// Restart from the first frame instead of failing at the end.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.next)
    }
}

impl CellSampler for ReplayCellTaps {
    fn read_frame(
        &mut self,
        _timeout: Duration,
    ) -> Result<[u16; FRAME_SLOTS], Box<dyn std::error::Error + Send + Sync>> {
        if self.next >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Err(Box::new(HwError::ReplayExhausted(self.frames.len())));
            }
            self.next = 0;
        }
        let frame = self.frames[self.next];
        self.next += 1;
        trace!(index = self.next - 1, "replayed frame");
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(10);

    #[test]
    fn disconnected_pack_reads_all_zero() {
        let mut taps = SimulatedCellTaps::new();
        assert_eq!(taps.read_frame(T).unwrap(), [0; FRAME_SLOTS]);
        assert_eq!(taps.reads(), 1);
    }

    #[test]
    fn pack_populates_leading_taps_only() {
        let mut taps = SimulatedCellTaps::with_pack(3, 0x800);
        let f = taps.read_frame(T).unwrap();
        assert_eq!(&f[1..7], &[0x800, 0x800, 0x800, 0, 0, 0]);
        assert_eq!(f[slot::PACK_SENSE], 0x800);
        assert_eq!(f[slot::THERMOCOUPLE2], SIM_THERMO_CODE);
    }

    #[test]
    fn ripple_cycles_around_nominal_and_skips_empty_taps() {
        let mut taps = SimulatedCellTaps::with_pack(1, 0x800).with_ripple(4);
        let a = taps.read_frame(T).unwrap();
        let b = taps.read_frame(T).unwrap();
        let c = taps.read_frame(T).unwrap();
        assert_eq!([a[1], b[1], c[1]], [0x7FC, 0x800, 0x804]);
        assert_eq!(a[2], 0);
    }

    #[test]
    fn codes_are_clamped_to_twelve_bits() {
        let mut taps = SimulatedCellTaps::with_pack(1, 0xFFFF).with_cell(5, 0x1234);
        let f = taps.read_frame(T).unwrap();
        assert_eq!(f[1], 0x0FFF);
        assert_eq!(f[6], 0x0FFF);
    }

    #[test]
    fn replay_exhausts_unless_looping() {
        let mut once = ReplayCellTaps::new(vec![[1; FRAME_SLOTS]]);
        assert_eq!(once.remaining(), 1);
        assert!(once.read_frame(T).is_ok());
        assert_eq!(once.remaining(), 0);
        let err = once.read_frame(T).unwrap_err();
        assert!(err.to_string().contains("exhausted"));

        let mut looped = ReplayCellTaps::new(vec![[1; FRAME_SLOTS], [2; FRAME_SLOTS]]).looping(true);
        let seq: Vec<u16> = (0..4).map(|_| looped.read_frame(T).unwrap()[0]).collect();
        assert_eq!(seq, vec![1, 2, 1, 2]);
    }
}
