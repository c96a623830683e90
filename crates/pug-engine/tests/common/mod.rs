//! Recording `GpuBackend` used by the integration tests.
//!
//! Every call and every handle release is appended to a shared log so tests
//! can assert creation and teardown order.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Result;
use pug_engine::device::{
    check_input_signature, BufferDesc, BufferKind, DrawIndexed, GpuBackend, InputElement,
    PipelineDesc, SurfaceErrorAction,
};
use pug_engine::shader::{FeatureLevel, ShaderBinary, ShaderInput, ShaderKind, ShaderPaths};

pub const VERTEX_SHADER: &str = "vertex shader";
pub const PIXEL_SHADER: &str = "pixel shader";
pub const INPUT_LAYOUT: &str = "input layout";
pub const PIPELINE: &str = "pipeline";
pub const DEVICE: &str = "device";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Create(&'static str),
    CreateFailed(&'static str),
    Update { label: &'static str, data: Vec<u8> },
    Draw { indices: std::ops::Range<u32>, clear: [f64; 4] },
    Present,
    Release(&'static str),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

/// A GPU object; releasing it records `Event::Release`.
#[derive(Debug)]
pub struct Handle {
    label: &'static str,
    log: Log,
}

impl Handle {
    fn new(label: &'static str, log: &Log) -> Self {
        log.borrow_mut().push(Event::Create(label));
        Self {
            label,
            log: log.clone(),
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Event::Release(self.label));
    }
}

#[derive(Debug)]
pub struct ShaderHandle {
    handle: Handle,
    inputs: Vec<ShaderInput>,
}

pub struct RecordingGpu {
    log: Log,
    size: (u32, u32),
    /// Creation of the object with this label fails.
    fail_on: Option<&'static str>,
    draw_result: Result<(), SurfaceErrorAction>,
}

impl RecordingGpu {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            size: (1280, 720),
            fail_on: None,
            draw_result: Ok(()),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn failing_on(mut self, label: &'static str) -> Self {
        self.fail_on = Some(label);
        self
    }

    pub fn with_draw_result(mut self, result: Result<(), SurfaceErrorAction>) -> Self {
        self.draw_result = result;
        self
    }

    fn create(&self, label: &'static str) -> Result<Handle> {
        if self.fail_on == Some(label) {
            self.log.borrow_mut().push(Event::CreateFailed(label));
            anyhow::bail!("injected failure creating {label}");
        }
        Ok(Handle::new(label, &self.log))
    }

    fn create_shader(&self, label: &'static str, binary: &ShaderBinary) -> Result<ShaderHandle> {
        let validated = binary.validate()?;
        let inputs = match binary.kind() {
            ShaderKind::Vertex => validated.inputs()?,
            ShaderKind::Pixel => Vec::new(),
        };
        Ok(ShaderHandle {
            handle: self.create(label)?,
            inputs,
        })
    }
}

impl Drop for RecordingGpu {
    fn drop(&mut self) {
        self.log.borrow_mut().push(Event::Release(DEVICE));
    }
}

impl GpuBackend for RecordingGpu {
    type Buffer = Handle;
    type VertexShader = ShaderHandle;
    type PixelShader = ShaderHandle;
    type InputLayout = Handle;
    type Pipeline = Handle;

    fn feature_level(&self) -> FeatureLevel {
        FeatureLevel::Level11_0
    }

    fn client_size(&self) -> (u32, u32) {
        self.size
    }

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<Handle> {
        if let Some(contents) = desc.contents {
            anyhow::ensure!(contents.len() as u64 == desc.size, "contents size mismatch");
        } else {
            anyhow::ensure!(desc.kind == BufferKind::Constant, "missing initial data");
        }
        self.create(desc.label)
    }

    fn create_vertex_shader(&mut self, binary: &ShaderBinary) -> Result<ShaderHandle> {
        self.create_shader(VERTEX_SHADER, binary)
    }

    fn create_input_layout(
        &mut self,
        elements: &[InputElement],
        _stride: u64,
        shader: &ShaderHandle,
    ) -> Result<Handle> {
        check_input_signature(elements, &shader.inputs)?;
        self.create(INPUT_LAYOUT)
    }

    fn create_pixel_shader(&mut self, binary: &ShaderBinary) -> Result<ShaderHandle> {
        self.create_shader(PIXEL_SHADER, binary)
    }

    fn create_pipeline(&mut self, _desc: &PipelineDesc<'_, Self>) -> Result<Handle> {
        self.create(PIPELINE)
    }

    fn update_subresource(&mut self, buffer: &Handle, data: &[u8]) {
        self.log.borrow_mut().push(Event::Update {
            label: buffer.label,
            data: data.to_vec(),
        });
    }

    fn draw_indexed(&mut self, draw: &DrawIndexed<'_, Self>) -> Result<(), SurfaceErrorAction> {
        let c = draw.clear.color;
        self.log.borrow_mut().push(Event::Draw {
            indices: draw.indices.clone(),
            clear: [c.r, c.g, c.b, c.a],
        });
        self.draw_result
    }

    fn present(&mut self) {
        self.log.borrow_mut().push(Event::Present);
    }
}

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Drains and returns the recorded events.
pub fn take(log: &Log) -> Vec<Event> {
    std::mem::take(&mut *log.borrow_mut())
}

pub fn released(events: &[Event]) -> Vec<&'static str> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Release(label) => Some(*label),
            _ => None,
        })
        .collect()
}

pub fn created(events: &[Event]) -> Vec<&'static str> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Create(label) => Some(*label),
            _ => None,
        })
        .collect()
}

/// The shaders shipped with the crate.
pub fn shipped_shaders() -> ShaderPaths {
    ShaderPaths::default()
}

/// Writes `vertex` and `pixel` WGSL into `dir` and returns their paths.
pub fn write_shaders(dir: &Path, vertex: &str, pixel: &str) -> ShaderPaths {
    let vertex_path: PathBuf = dir.join("vertex.wgsl");
    let pixel_path: PathBuf = dir.join("pixel.wgsl");
    std::fs::write(&vertex_path, vertex).unwrap();
    std::fs::write(&pixel_path, pixel).unwrap();
    ShaderPaths {
        vertex: vertex_path,
        pixel: pixel_path,
    }
}

pub const PIXEL_WGSL: &str = r#"
@fragment
fn ps_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

/// Vertex shader whose COLOR input is a vec4 instead of the cube's vec3.
pub const MISMATCHED_VERTEX_WGSL: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}
"#;
