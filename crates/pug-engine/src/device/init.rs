/// Initialization parameters for the GPU layer.
///
/// Keep this structure minimal. Add configuration flags only when a concrete
/// platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Wait for vertical sync on present (present interval 1).
    ///
    /// When false, present does not wait and may tear (present interval 0).
    pub vsync: bool,

    /// Prefer an sRGB surface format when available.
    ///
    /// Off by default: vertex and clear colours are authored for a linear (UNORM) back buffer.
    pub prefer_srgb: bool,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface. A hint; support depends on backend.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Present mode matching the vsync setting.
    pub fn present_mode(&self) -> wgpu::PresentMode {
        present_mode_for(self.vsync)
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            vsync: false,
            prefer_srgb: false,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Maps the vsync flag to a present mode every surface supports.
///
/// The `Auto*` modes fall back (Immediate → Mailbox → Fifo) when the exact
/// mode is unavailable.
pub fn present_mode_for(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}
