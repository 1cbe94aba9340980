use winit::dpi::PhysicalSize;

/// Render viewport in physical pixels, anchored at the surface origin.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height, or `None` for a zero-area viewport (e.g. minimized).
    #[inline]
    pub fn aspect(self) -> Option<f32> {
        self.is_valid()
            .then(|| self.width as f32 / self.height as f32)
    }

    /// `(x, y, width, height)` as passed to `RenderPass::set_viewport`.
    #[inline]
    pub fn rect(self) -> (f32, f32, f32, f32) {
        (0.0, 0.0, self.width as f32, self.height as f32)
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_resized_viewport() {
        let v = Viewport::from(PhysicalSize::new(800, 600));
        assert_eq!(v.rect(), (0.0, 0.0, 800.0, 600.0));
        assert_eq!(v.aspect(), Some(800.0 / 600.0));
    }

    #[test]
    fn zero_area_has_no_aspect() {
        assert_eq!(Viewport::new(0, 480).aspect(), None);
        assert_eq!(Viewport::new(640, 0).aspect(), None);
        assert!(!Viewport::default().is_valid());
    }
}
