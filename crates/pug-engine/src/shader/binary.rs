use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::ShaderKind;

/// Raw shader file contents, read once at load time.
///
/// Reading does not interpret the bytes; [`ShaderBinary::validate`] does, and
/// GPU-object creation calls it before touching the device.
#[derive(Debug, Clone)]
pub struct ShaderBinary {
    kind: ShaderKind,
    path: PathBuf,
    bytes: Vec<u8>,
}

impl ShaderBinary {
    /// Reads a shader file from disk.
    pub fn read(kind: ShaderKind, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {} from {}", kind.label(), path.display()))?;

        log::debug!("read {} ({} bytes) from {}", kind.label(), bytes.len(), path.display());

        Ok(Self {
            kind,
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Wraps in-memory bytes; `origin` is only used in diagnostics.
    pub fn from_bytes(kind: ShaderKind, origin: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            path: origin.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses and validates the shader, and checks that the entry point for its kind exists.
    pub fn validate(&self) -> Result<ValidatedShader> {
        let source = std::str::from_utf8(&self.bytes).with_context(|| {
            format!("{} {} is not valid UTF-8", self.kind.label(), self.path.display())
        })?;

        let module = naga::front::wgsl::parse_str(source).map_err(|e| {
            anyhow::anyhow!(
                "{} {} failed to parse:\n{}",
                self.kind.label(),
                self.path.display(),
                e.emit_to_string(source)
            )
        })?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        );
        validator.validate(&module).map_err(|e| {
            anyhow::anyhow!(
                "{} {} failed validation: {}",
                self.kind.label(),
                self.path.display(),
                e.emit_to_string(source)
            )
        })?;

        let entry_point = self.kind.entry_point();
        let stage = self.kind.naga_stage();
        let index = module
            .entry_points
            .iter()
            .position(|ep| ep.name == entry_point && ep.stage == stage)
            .with_context(|| {
                format!(
                    "{} {} has no `{entry_point}` entry point",
                    self.kind.label(),
                    self.path.display()
                )
            })?;

        Ok(ValidatedShader {
            kind: self.kind,
            source: source.to_owned(),
            module,
            entry_index: index,
        })
    }
}

/// One location-bound input of a vertex entry point.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShaderInput {
    pub location: u32,
    pub format: wgpu::VertexFormat,
}

/// A shader that parsed and validated cleanly.
#[derive(Debug)]
pub struct ValidatedShader {
    kind: ShaderKind,
    source: String,
    module: naga::Module,
    entry_index: usize,
}

impl ValidatedShader {
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn entry_point(&self) -> &'static str {
        self.kind.entry_point()
    }

    /// WGSL source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Location-bound inputs of the entry point, sorted by location.
    ///
    /// Built-in inputs (e.g. `vertex_index`) are skipped. Struct arguments are flattened.
    pub fn inputs(&self) -> Result<Vec<ShaderInput>> {
        let ep = &self.module.entry_points[self.entry_index];
        let mut inputs = Vec::new();

        for arg in &ep.function.arguments {
            match &arg.binding {
                Some(binding) => push_input(&self.module, binding, arg.ty, &mut inputs)?,
                None => {
                    let naga::TypeInner::Struct { members, .. } = &self.module.types[arg.ty].inner
                    else {
                        anyhow::bail!("entry point argument without binding is not a struct");
                    };
                    for member in members {
                        if let Some(binding) = &member.binding {
                            push_input(&self.module, binding, member.ty, &mut inputs)?;
                        }
                    }
                }
            }
        }

        inputs.sort_by_key(|i| i.location);
        Ok(inputs)
    }
}

fn push_input(
    module: &naga::Module,
    binding: &naga::Binding,
    ty: naga::Handle<naga::Type>,
    out: &mut Vec<ShaderInput>,
) -> Result<()> {
    let naga::Binding::Location { location, .. } = binding else {
        return Ok(());
    };

    let format = vertex_format(&module.types[ty].inner)
        .with_context(|| format!("input @location({location}) has no vertex format equivalent"))?;

    out.push(ShaderInput {
        location: *location,
        format,
    });
    Ok(())
}

fn vertex_format(inner: &naga::TypeInner) -> Option<wgpu::VertexFormat> {
    use naga::{ScalarKind, VectorSize};
    use wgpu::VertexFormat as F;

    let (scalar, size) = match *inner {
        naga::TypeInner::Scalar(scalar) => (scalar, None),
        naga::TypeInner::Vector { size, scalar } => (scalar, Some(size)),
        _ => return None,
    };

    if scalar.width != 4 {
        return None;
    }

    let format = match (scalar.kind, size) {
        (ScalarKind::Float, None) => F::Float32,
        (ScalarKind::Float, Some(VectorSize::Bi)) => F::Float32x2,
        (ScalarKind::Float, Some(VectorSize::Tri)) => F::Float32x3,
        (ScalarKind::Float, Some(VectorSize::Quad)) => F::Float32x4,
        (ScalarKind::Sint, None) => F::Sint32,
        (ScalarKind::Sint, Some(VectorSize::Bi)) => F::Sint32x2,
        (ScalarKind::Sint, Some(VectorSize::Tri)) => F::Sint32x3,
        (ScalarKind::Sint, Some(VectorSize::Quad)) => F::Sint32x4,
        (ScalarKind::Uint, None) => F::Uint32,
        (ScalarKind::Uint, Some(VectorSize::Bi)) => F::Uint32x2,
        (ScalarKind::Uint, Some(VectorSize::Tri)) => F::Uint32x3,
        (ScalarKind::Uint, Some(VectorSize::Quad)) => F::Uint32x4,
        _ => return None,
    };

    Some(format)
}
