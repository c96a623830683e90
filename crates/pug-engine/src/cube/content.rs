use anyhow::{Context, Result};

use crate::device::{BufferDesc, BufferKind, ClearValues, DrawIndexed, GpuBackend, PipelineDesc};
use crate::shader::{latest_profile, ShaderBinary, ShaderKind, ShaderPaths};

use super::constants::{ConstantBlock, ConstantBufferSlot};
use super::geometry::{
    index_bytes, vertex_bytes, Vertex, CUBE_INDICES, INDEX_FORMAT, INPUT_ELEMENTS,
};

/// GPU objects created by a content load.
///
/// Fields are declared in release order: the linked pipeline first (it
/// references everything below), then constant buffers, index buffer, vertex
/// buffer, input layout, vertex shader and pixel shader.
pub struct Content<B: GpuBackend> {
    pipeline: B::Pipeline,
    /// Indexed by `ConstantBufferSlot`.
    constant_buffers: [B::Buffer; 3],
    index_buffer: B::Buffer,
    vertex_buffer: B::Buffer,
    input_layout: B::InputLayout,
    vertex_shader: B::VertexShader,
    pixel_shader: B::PixelShader,
}

impl<B: GpuBackend> Content<B> {
    /// Creates every pipeline object, in order, stopping at the first failure.
    ///
    /// Objects created before a failure are released when this returns.
    pub fn load(gpu: &mut B, shaders: &ShaderPaths) -> Result<Self> {
        let level = gpu.feature_level();
        log::debug!(
            "feature level {level:?}: {} / {}",
            latest_profile(level, ShaderKind::Vertex),
            latest_profile(level, ShaderKind::Pixel)
        );

        let vertex_buffer = gpu
            .create_buffer(&BufferDesc {
                label: "pug cube vertex buffer",
                kind: BufferKind::Vertex,
                size: vertex_bytes().len() as u64,
                contents: Some(vertex_bytes()),
            })
            .context("failed to create vertex buffer")?;

        let index_buffer = gpu
            .create_buffer(&BufferDesc {
                label: "pug cube index buffer",
                kind: BufferKind::Index,
                size: index_bytes().len() as u64,
                contents: Some(index_bytes()),
            })
            .context("failed to create index buffer")?;

        let constant_buffers = [
            create_constant_buffer(gpu, ConstantBufferSlot::Application)?,
            create_constant_buffer(gpu, ConstantBufferSlot::Frame)?,
            create_constant_buffer(gpu, ConstantBufferSlot::Object)?,
        ];

        let vs_binary = ShaderBinary::read(ShaderKind::Vertex, &shaders.vertex)?;
        let vertex_shader = gpu
            .create_vertex_shader(&vs_binary)
            .context("failed to create vertex shader")?;

        // Built from the same shader object so the layout matches its signature.
        let input_layout = gpu
            .create_input_layout(&INPUT_ELEMENTS, Vertex::STRIDE, &vertex_shader)
            .context("failed to create input layout")?;

        let ps_binary = ShaderBinary::read(ShaderKind::Pixel, &shaders.pixel)?;
        let pixel_shader = gpu
            .create_pixel_shader(&ps_binary)
            .context("failed to create pixel shader")?;

        let pipeline = gpu
            .create_pipeline(&PipelineDesc {
                vertex_shader: &vertex_shader,
                input_layout: &input_layout,
                pixel_shader: &pixel_shader,
                constant_buffers: [
                    &constant_buffers[0],
                    &constant_buffers[1],
                    &constant_buffers[2],
                ],
            })
            .context("failed to create pipeline")?;

        Ok(Self {
            pipeline,
            constant_buffers,
            index_buffer,
            vertex_buffer,
            input_layout,
            vertex_shader,
            pixel_shader,
        })
    }

    pub fn constant_buffer(&self, slot: ConstantBufferSlot) -> &B::Buffer {
        &self.constant_buffers[slot.index()]
    }

    /// The single indexed draw covering all cube indices.
    pub fn draw_call(&self, clear: ClearValues) -> DrawIndexed<'_, B> {
        DrawIndexed {
            clear,
            pipeline: &self.pipeline,
            vertex_buffer: &self.vertex_buffer,
            vertex_stride: Vertex::STRIDE,
            index_buffer: &self.index_buffer,
            index_format: INDEX_FORMAT,
            indices: 0..CUBE_INDICES.len() as u32,
        }
    }
}

fn create_constant_buffer<B: GpuBackend>(gpu: &mut B, slot: ConstantBufferSlot) -> Result<B::Buffer> {
    gpu.create_buffer(&BufferDesc {
        label: slot.label(),
        kind: BufferKind::Constant,
        size: ConstantBlock::SIZE,
        contents: None,
    })
    .with_context(|| format!("failed to create {slot:?} constant buffer"))
}
