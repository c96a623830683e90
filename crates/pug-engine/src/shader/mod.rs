//! Shader files, validation and profile lookup.
//!
//! Shaders ship as WGSL files at two fixed paths and are read at load time.
//! Validation happens on the CPU with `naga` before any GPU object is created,
//! so a malformed file or a vertex-input mismatch fails the load deterministically.

mod binary;
mod profile;

use std::path::{Path, PathBuf};

pub use binary::{ShaderBinary, ShaderInput, ValidatedShader};
pub use profile::{latest_profile, FeatureLevel, ShaderKind, ShaderProfile};

/// Directory holding the shipped shaders, relative to the working directory.
pub const SHADER_DIR: &str = "shaders";
pub const VERTEX_SHADER_FILE: &str = "simple_vertex.wgsl";
pub const PIXEL_SHADER_FILE: &str = "simple_pixel.wgsl";

/// File-system locations of the vertex and pixel shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub pixel: PathBuf,
}

impl ShaderPaths {
    /// The two shader files inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vertex: dir.join(VERTEX_SHADER_FILE),
            pixel: dir.join(PIXEL_SHADER_FILE),
        }
    }

    /// Working-directory paths if both files exist there, else the `shaders`
    /// directory next to the executable, else the working-directory paths.
    pub fn locate() -> Self {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| Self::in_dir(dir.join(SHADER_DIR))));

        std::iter::once(Self::default())
            .chain(beside_exe)
            .find(Self::exist)
            .unwrap_or_default()
    }

    /// Both files are present.
    pub fn exist(&self) -> bool {
        self.vertex.is_file() && self.pixel.is_file()
    }
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self::in_dir(SHADER_DIR)
    }
}
