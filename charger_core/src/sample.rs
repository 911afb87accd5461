//! Raw converter codes and the per-cycle conversion frame.

use crate::error::SampleError;

pub use charger_traits::{FRAME_SLOTS, MAX_RAW_CODE};

/// Number of series cell taps.
pub const CELL_COUNT: usize = 6;

/// A single 12-bit converter code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawSample(u16);

impl RawSample {
    pub const ZERO: Self = Self(0);

    pub fn new(code: u16) -> Result<Self, SampleError> {
        if code > MAX_RAW_CODE {
            return Err(SampleError::OutOfRange { code });
        }
        Ok(Self(code))
    }

    /// Keep only the low 12 bits, as the converter's result register does.
    #[inline]
    pub const fn masked(code: u16) -> Self {
        Self(code & MAX_RAW_CODE)
    }

    #[inline]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Validate a fixed-size group of codes at once.
    pub fn array<const N: usize>(codes: [u16; N]) -> Result<[Self; N], SampleError> {
        let mut out = [Self::ZERO; N];
        for (dst, code) in out.iter_mut().zip(codes) {
            *dst = Self::new(code)?;
        }
        Ok(out)
    }
}

impl TryFrom<u16> for RawSample {
    type Error = SampleError;
    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<RawSample> for u16 {
    fn from(s: RawSample) -> Self {
        s.0
    }
}

/// One full conversion sequence.
///
/// Slot order: pack sense, cell 0..=5, pack current, thermocouple 1,
/// thermocouple 2. Only the cell taps feed classification; the auxiliary
/// slots ride along for the alarm stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleFrame {
    pub pack_sense: RawSample,
    pub cells: [RawSample; CELL_COUNT],
    pub pack_current: RawSample,
    pub thermocouples: [RawSample; 2],
}

impl SampleFrame {
    /// Frame with the given cell taps and zeroed auxiliary channels.
    pub fn from_cells(cells: [RawSample; CELL_COUNT]) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn from_sequence(seq: &[u16]) -> Result<Self, SampleError> {
        let slots: &[u16; FRAME_SLOTS] =
            seq.try_into().map_err(|_| SampleError::SequenceLength {
                expected: FRAME_SLOTS,
                actual: seq.len(),
            })?;
        let s = RawSample::array(*slots)?;
        Ok(Self {
            pack_sense: s[0],
            cells: [s[1], s[2], s[3], s[4], s[5], s[6]],
            pack_current: s[7],
            thermocouples: [s[8], s[9]],
        })
    }

    #[inline]
    pub fn cells(&self) -> [RawSample; CELL_COUNT] {
        self.cells
    }

    pub fn cell_codes(&self) -> [u16; CELL_COUNT] {
        self.cells.map(RawSample::code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_codes_above_twelve_bits() {
        assert_eq!(RawSample::new(0x0FFF).map(RawSample::code), Ok(0x0FFF));
        assert_eq!(
            RawSample::new(0x1000),
            Err(SampleError::OutOfRange { code: 0x1000 })
        );
    }

    #[test]
    fn masked_keeps_low_bits() {
        assert_eq!(RawSample::masked(0xF800).code(), 0x0800);
    }

    #[test]
    fn frame_maps_sequencer_slots() {
        let f = SampleFrame::from_sequence(&[10, 1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        assert_eq!(f.pack_sense.code(), 10);
        assert_eq!(f.cell_codes(), [1, 2, 3, 4, 5, 6]);
        assert_eq!(f.pack_current.code(), 7);
        assert_eq!(f.thermocouples.map(RawSample::code), [8, 9]);
    }

    #[test]
    fn frame_rejects_short_sequence() {
        let err = SampleFrame::from_sequence(&[0; 7]).unwrap_err();
        assert_eq!(
            err,
            SampleError::SequenceLength {
                expected: FRAME_SLOTS,
                actual: 7
            }
        );
    }

    #[test]
    fn frame_rejects_out_of_range_aux_slot() {
        let mut seq = [0u16; FRAME_SLOTS];
        seq[9] = 0x2000;
        assert!(matches!(
            SampleFrame::from_sequence(&seq),
            Err(SampleError::OutOfRange { code: 0x2000 })
        ));
    }
}
