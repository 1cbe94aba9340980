use anyhow::Result;

use spinlit_engine::coords::Viewport;
use spinlit_engine::core::{App, AppControl, FrameCtx};
use spinlit_engine::device::Gpu;
use spinlit_engine::input::{InputFrame, Key};
use spinlit_engine::render::{ShaderProgram, TextureImage};

use crate::geometry::NormalSource;
use crate::locations::UniformLocations;
use crate::renderer::SceneRenderer;
use crate::scene::CLEAR_COLOR;
use crate::transform::FrameTransforms;

/// Everything prepared before the window opens.
pub struct SceneAssets {
    pub program: ShaderProgram,
    pub locations: UniformLocations,
    pub diffuse: TextureImage,
    pub specular: TextureImage,
    pub normals: NormalSource,
}

pub struct SpinningApp {
    assets: SceneAssets,
    renderer: Option<SceneRenderer>,
    viewport: Viewport,
    close_requested: bool,
}

impl SpinningApp {
    pub fn new(assets: SceneAssets) -> Self {
        Self {
            assets,
            renderer: None,
            viewport: Viewport::default(),
            close_requested: false,
        }
    }

    /// View and projection for the current viewport; `None` while the
    /// window has no drawable area.
    fn frame_transforms(&self) -> Option<FrameTransforms> {
        FrameTransforms::compute(self.viewport)
    }

    fn poll_input(&mut self, input: &InputFrame) {
        if input.pressed(Key::Escape) {
            self.close_requested = true;
        }
    }
}

impl App for SpinningApp {
    fn on_gpu_ready(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let assets = &self.assets;
        log::info!(
            "Shader entry points: {} / {}",
            assets.program.vertex_entry(),
            assets.program.fragment_entry()
        );

        self.renderer = Some(SceneRenderer::new(
            gpu,
            &assets.program,
            assets.locations.clone(),
            &assets.diffuse,
            &assets.specular,
            assets.normals,
        )?);

        self.viewport = gpu.size().into();
        log::info!(
            "Starting viewport: (width: {}, height: {})",
            self.viewport.width,
            self.viewport.height
        );
        Ok(())
    }

    fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        log::info!(
            "New viewport: (width: {}, height: {})",
            viewport.width,
            viewport.height
        );
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        self.poll_input(ctx.input_frame);
        if self.close_requested {
            return Ok(AppControl::Exit);
        }

        // Minimized.
        let Some(transforms) = self.frame_transforms() else {
            return Ok(AppControl::Continue);
        };

        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let t = ctx.time.elapsed as f32;
        ctx.render(CLEAR_COLOR, |rctx, target| {
            renderer.render(rctx, target, &transforms, t)
        })
    }

    fn on_shutdown(&mut self) {
        if self.renderer.take().is_some() {
            log::debug!("scene resources released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::{FRAGMENT_SHADER, VERTEX_SHADER};

    fn app() -> SpinningApp {
        let program = ShaderProgram::compile(VERTEX_SHADER, FRAGMENT_SHADER).unwrap();
        let locations = UniformLocations::resolve(&program).unwrap();
        SpinningApp::new(SceneAssets {
            program,
            locations,
            diffuse: TextureImage::solid([255; 4]),
            specular: TextureImage::solid([0, 0, 0, 255]),
            normals: NormalSource::FaceGeometry,
        })
    }

    #[test]
    fn resize_drives_next_frame_transforms() {
        let mut app = app();
        app.on_resize(Viewport::new(800, 600));

        let xf = app.frame_transforms().unwrap();
        assert_eq!(xf.viewport.rect(), (0.0, 0.0, 800.0, 600.0));
        assert_eq!(xf.projection, crate::transform::projection_matrix(Viewport::new(800, 600)).unwrap());
        let p = xf.projection;
        let aspect = p[(1, 1)] / p[(0, 0)];
        assert!((aspect - 800.0 / 600.0).abs() < 1e-5);
    }

    #[test]
    fn minimized_window_has_no_frame_transforms() {
        let mut app = app();
        assert!(app.frame_transforms().is_none());

        app.on_resize(Viewport::new(0, 0));
        assert!(app.frame_transforms().is_none());
    }

    #[test]
    fn escape_requests_close() {
        let mut app = app();

        let mut frame = InputFrame::default();
        frame.keys_pressed.insert(Key::Unknown(42));
        app.poll_input(&frame);
        assert!(!app.close_requested);

        frame.keys_pressed.insert(Key::Escape);
        app.poll_input(&frame);
        assert!(app.close_requested);

        // The flag sticks once set.
        app.poll_input(&InputFrame::default());
        assert!(app.close_requested);
    }
}
