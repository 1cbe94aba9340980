/// How the device and surface are set up when the window opens.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format if the surface offers one. Shaders that
    /// already output display-ready colour want `false`.
    pub prefer_srgb: bool,

    /// Fifo is always available and vsyncs the redraw loop.
    pub present_mode: wgpu::PresentMode,

    /// Requested alpha mode; falls back to the surface's first supported one.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Latency hint passed through to the surface configuration.
    pub desired_maximum_frame_latency: u32,

    /// Depth buffer format, resized along with the surface. `None` renders
    /// without depth.
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
        }
    }
}
