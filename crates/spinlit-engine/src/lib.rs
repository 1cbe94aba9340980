//! spinlit engine crate.
//!
//! Owns the platform + GPU runtime pieces used by the demo: window loop, wgpu
//! device/surface, input translation, frame timing, logging and the small set
//! of render helpers (shader programs, uniform blocks, textures, depth).

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
