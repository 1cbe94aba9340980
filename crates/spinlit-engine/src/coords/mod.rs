//! Coordinate types shared by the runtime and renderers.
//!
//! Sizes here are physical pixels: the viewport maps 1:1 onto the surface
//! texture the frame is rendered into.

mod viewport;

pub use viewport::Viewport;
