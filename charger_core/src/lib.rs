#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core charger logic (hardware-agnostic).
//!
//! This crate turns raw 12-bit cell tap readings into a cell count and fault
//! flag, and ranks per-cell readings for the balancing and alarm stages. All
//! hardware interaction goes through `charger_traits::CellSampler`.
//!
//! ## Architecture
//!
//! - **Samples**: `RawSample` codes and the ten-slot `SampleFrame` (`sample`)
//! - **Thresholds**: presence / damaged / healthy bands (`thresholds`)
//! - **Classification**: prefix population model with fault flag (`classify`)
//! - **Ranking**: in-place selection sort of cell codes (`rank`)
//! - **Alarms**: boundary trait for the settable alarm stage (`alarms`)
//! - **Runner**: the single-threaded sampling cycle (`runner`)
//!
//! ## Example
//!
//! ```
//! use charger_core::{RawSample, classify};
//!
//! let taps = RawSample::array([0x800, 0x800, 0x000, 0x000, 0x000, 0x000]).unwrap();
//! let r = classify(taps);
//! assert_eq!((r.cell_count, r.fault), (2, false));
//! ```

pub mod alarms;
pub mod classify;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod rank;
pub mod runner;
pub mod sample;
pub mod status;
pub mod thresholds;
pub mod util;

pub use alarms::{AlarmSink, SettableAlarms};
pub use classify::{ClassificationResult, classify};
pub use error::{BuildError, ChargerError, SampleError};
pub use rank::{RANK_DIRECTION, RankDirection, RankScope, RankedCells, rank_cells, rank_descending};
pub use runner::{CycleRunner, CycleRunnerBuilder};
pub use sample::{CELL_COUNT, FRAME_SLOTS, MAX_RAW_CODE, RawSample, SampleFrame};
pub use status::{CycleReport, RunSummary};
pub use thresholds::{CellBand, PRESENT_HIGH, PRESENT_LOW, VoltageThresholds};
