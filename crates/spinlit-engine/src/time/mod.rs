//! Frame timing.
//!
//! The runtime owns one `FrameClock` per window, started when the window
//! opens, and ticks it once per redraw. `FrameTime::elapsed` is the
//! animation time apps should derive motion from.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
