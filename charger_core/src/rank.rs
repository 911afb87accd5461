//! Cell voltage ranking.
//!
//! Despite its name, `rank_descending` leaves the lowest value at index 0.
//! Downstream balancing code was written against that order, so the
//! direction is published as [`RANK_DIRECTION`] rather than changed.

use crate::classify::ClassificationResult;
use crate::sample::{CELL_COUNT, SampleFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDirection {
    Ascending,
    Descending,
}

impl RankDirection {
    pub fn name(self) -> &'static str {
        match self {
            RankDirection::Ascending => "ascending",
            RankDirection::Descending => "descending",
        }
    }
}

/// Order actually produced by [`rank_descending`].
pub const RANK_DIRECTION: RankDirection = RankDirection::Ascending;

/// Which taps take part in ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankScope {
    /// The populated prefix reported by the classifier.
    #[default]
    Populated,
    /// All six taps.
    All,
}

/// In-place selection sort by minimum. Not stable; allocation free.
pub fn rank_descending<T: Ord>(values: &mut [T]) {
    let n = values.len();
    for i in 0..n.saturating_sub(1) {
        let min_idx = (i + 1..n).fold(i, |m, j| if values[j] < values[m] { j } else { m });
        values.swap(min_idx, i);
    }
}

/// Ranked cell codes for one cycle. Position reflects rank, not tap index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankedCells {
    values: [u16; CELL_COUNT],
    len: usize,
}

impl RankedCells {
    pub fn as_slice(&self) -> &[u16] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lowest and highest ranked codes, if any cell took part.
    pub fn extremes(&self) -> Option<(u16, u16)> {
        let s = self.as_slice();
        Some((*s.first()?, *s.last()?))
    }

    /// Gap between the highest and lowest ranked codes; 0 with fewer than two cells.
    pub fn spread(&self) -> u16 {
        self.extremes().map_or(0, |(lo, hi)| hi.saturating_sub(lo))
    }
}

/// Copy the taps selected by `scope` out of `frame` and rank them.
pub fn rank_cells(
    frame: &SampleFrame,
    classification: ClassificationResult,
    scope: RankScope,
) -> RankedCells {
    let len = match scope {
        RankScope::Populated => usize::from(classification.cell_count).min(CELL_COUNT),
        RankScope::All => CELL_COUNT,
    };
    let mut values = frame.cell_codes();
    rank_descending(&mut values[..len]);
    RankedCells { values, len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::RawSample;

    #[test]
    fn empty_and_single_are_noops() {
        let mut empty: [u16; 0] = [];
        rank_descending(&mut empty);
        let mut one = [7u16];
        rank_descending(&mut one);
        assert_eq!(one, [7]);
    }

    #[test]
    fn lowest_lands_first() {
        let mut v = [0x820, 0x7F0, 0x805, 0x7F0, 0x830];
        rank_descending(&mut v);
        assert_eq!(v, [0x7F0, 0x7F0, 0x805, 0x820, 0x830]);
        assert_eq!(RANK_DIRECTION, RankDirection::Ascending);
    }

    #[test]
    fn populated_scope_ranks_only_the_prefix() {
        let frame = SampleFrame::from_cells(
            [0x830, 0x800, 0x810, 0x000, 0x000, 0x000].map(RawSample::masked),
        );
        let r = rank_cells(
            &frame,
            ClassificationResult {
                cell_count: 3,
                fault: false,
            },
            RankScope::Populated,
        );
        assert_eq!(r.as_slice(), &[0x800, 0x810, 0x830]);
        assert_eq!(r.extremes(), Some((0x800, 0x830)));
        assert_eq!(r.spread(), 0x30);
    }

    #[test]
    fn all_scope_ignores_classification() {
        let frame =
            SampleFrame::from_cells([5, 4, 3, 2, 1, 0].map(RawSample::masked));
        let r = rank_cells(&frame, ClassificationResult::DISCONNECTED, RankScope::All);
        assert_eq!(r.as_slice(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn disconnected_populated_scope_is_empty() {
        let r = rank_cells(
            &SampleFrame::default(),
            ClassificationResult::DISCONNECTED,
            RankScope::Populated,
        );
        assert!(r.is_empty());
        assert_eq!(r.extremes(), None);
        assert_eq!(r.spread(), 0);
    }
}
