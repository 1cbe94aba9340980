use anyhow::Result;
use winit::event::WindowEvent;

use crate::coords::Viewport;
use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// Callback order: `on_gpu_ready` once after the window and device exist, then
/// any number of `on_window_event`/`on_resize`/`on_frame`, then `on_shutdown`
/// once before the device is released.
pub trait App {
    /// Creates GPU resources. An error aborts startup.
    fn on_gpu_ready(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let _ = gpu;
        Ok(())
    }

    /// Called for raw window events before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called after the surface was resized. No frame is rendered by the
    /// runtime as part of this call.
    fn on_resize(&mut self, viewport: Viewport) {
        let _ = viewport;
    }

    /// Called once per rendered frame. An error shuts the runtime down with a
    /// failure status.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;

    /// Releases application-owned GPU resources.
    fn on_shutdown(&mut self) {}
}
