//! Hardware seams shared by the charger crates.
//!
//! The core never talks to a converter directly; it pulls whole conversion
//! sequences through [`CellSampler`] and paces its polling loop through
//! [`Clock`].

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Largest code a 12-bit converter produces.
pub const MAX_RAW_CODE: u16 = 0x0FFF;

/// Number of result slots in one conversion sequence.
///
/// Slot layout: pack sense, cell 0..=5, pack current, thermocouple 1,
/// thermocouple 2.
pub const FRAME_SLOTS: usize = 10;

/// Source of raw 12-bit conversion sequences, one per sampling cycle.
pub trait CellSampler {
    /// Block until a full sequence has been converted or `timeout` expires.
    fn read_frame(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<[u16; FRAME_SLOTS], Box<dyn std::error::Error + Send + Sync>>;
}

impl<S: CellSampler + ?Sized> CellSampler for Box<S> {
    fn read_frame(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<[u16; FRAME_SLOTS], Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_frame(timeout)
    }
}
