//! Playback synchronization: the clock estimating track position and the
//! cursor selecting the line to display.

pub mod clock;
pub mod cursor;

pub use clock::PlaybackClock;
pub use cursor::{Selection, select};
