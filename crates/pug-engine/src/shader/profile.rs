/// Shader stage tag used for profile lookup and entry-point selection.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderKind {
    Vertex,
    Pixel,
}

impl ShaderKind {
    /// Entry point every shader of this kind must export.
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vs_main",
            ShaderKind::Pixel => "ps_main",
        }
    }

    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderKind::Vertex => naga::ShaderStage::Vertex,
            ShaderKind::Pixel => naga::ShaderStage::Fragment,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Vertex => "vertex shader",
            ShaderKind::Pixel => "pixel shader",
        }
    }
}

/// Capability tier of the GPU/driver, in ascending order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FeatureLevel {
    Level9_1,
    Level9_2,
    Level9_3,
    Level10_0,
    Level10_1,
    Level11_0,
    Level11_1,
}

impl FeatureLevel {
    /// Maps wgpu's downlevel shader model onto a feature level.
    ///
    /// wgpu does not distinguish the .1 tiers, so the lowest level of each model is reported.
    pub fn from_shader_model(model: wgpu::ShaderModel) -> Self {
        match model {
            wgpu::ShaderModel::Sm2 => FeatureLevel::Level9_1,
            wgpu::ShaderModel::Sm4 => FeatureLevel::Level10_0,
            wgpu::ShaderModel::Sm5 => FeatureLevel::Level11_0,
        }
    }
}

/// Shader compilation profile for a given stage and feature level.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderProfile {
    Vs5_0,
    Vs4_1,
    Vs4_0,
    Vs4_0Level9_3,
    Vs4_0Level9_1,
    Ps5_0,
    Ps4_1,
    Ps4_0,
    Ps4_0Level9_3,
    Ps4_0Level9_1,
}

impl ShaderProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderProfile::Vs5_0 => "vs_5_0",
            ShaderProfile::Vs4_1 => "vs_4_1",
            ShaderProfile::Vs4_0 => "vs_4_0",
            ShaderProfile::Vs4_0Level9_3 => "vs_4_0_level_9_3",
            ShaderProfile::Vs4_0Level9_1 => "vs_4_0_level_9_1",
            ShaderProfile::Ps5_0 => "ps_5_0",
            ShaderProfile::Ps4_1 => "ps_4_1",
            ShaderProfile::Ps4_0 => "ps_4_0",
            ShaderProfile::Ps4_0Level9_3 => "ps_4_0_level_9_3",
            ShaderProfile::Ps4_0Level9_1 => "ps_4_0_level_9_1",
        }
    }
}

impl std::fmt::Display for ShaderProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the newest profile a shader of `kind` may target at `level`.
///
/// Shaders ship as source and are not compiled against this profile; it is
/// reported for diagnostics.
pub fn latest_profile(level: FeatureLevel, kind: ShaderKind) -> ShaderProfile {
    use FeatureLevel::*;
    use ShaderProfile::*;

    match (kind, level) {
        (ShaderKind::Vertex, Level11_1 | Level11_0) => Vs5_0,
        (ShaderKind::Vertex, Level10_1) => Vs4_1,
        (ShaderKind::Vertex, Level10_0) => Vs4_0,
        (ShaderKind::Vertex, Level9_3) => Vs4_0Level9_3,
        (ShaderKind::Vertex, Level9_2 | Level9_1) => Vs4_0Level9_1,

        (ShaderKind::Pixel, Level11_1 | Level11_0) => Ps5_0,
        (ShaderKind::Pixel, Level10_1) => Ps4_1,
        (ShaderKind::Pixel, Level10_0) => Ps4_0,
        (ShaderKind::Pixel, Level9_3) => Ps4_0Level9_3,
        (ShaderKind::Pixel, Level9_2 | Level9_1) => Ps4_0Level9_1,
    }
}
