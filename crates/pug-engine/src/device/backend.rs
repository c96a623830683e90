use std::ops::Range;

use anyhow::Result;

use crate::shader::{FeatureLevel, ShaderBinary, ShaderInput};

use super::SurfaceErrorAction;

/// GPU device/context/swap-chain capability consumed by the cube renderer.
///
/// Implemented by [`super::Gpu`] over wgpu. Handle types are owned by the caller;
/// dropping a handle releases the GPU object.
pub trait GpuBackend {
    type Buffer;
    type VertexShader;
    type PixelShader;
    type InputLayout;
    type Pipeline;

    /// Capability tier of the device.
    fn feature_level(&self) -> FeatureLevel;

    /// Drawable client-area size in physical pixels.
    fn client_size(&self) -> (u32, u32);

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<Self::Buffer>;

    fn create_vertex_shader(&mut self, binary: &ShaderBinary) -> Result<Self::VertexShader>;

    /// Binds vertex attributes to the input signature of `shader`.
    ///
    /// Fails if an element has no matching shader input, a format differs,
    /// or the shader consumes a location the layout does not provide.
    fn create_input_layout(
        &mut self,
        elements: &[InputElement],
        stride: u64,
        shader: &Self::VertexShader,
    ) -> Result<Self::InputLayout>;

    fn create_pixel_shader(&mut self, binary: &ShaderBinary) -> Result<Self::PixelShader>;

    /// Links shaders, input layout and constant buffers with the device's
    /// rasterizer and depth-stencil state.
    fn create_pipeline(&mut self, desc: &PipelineDesc<'_, Self>) -> Result<Self::Pipeline>;

    /// Overwrites the full contents of `buffer`.
    fn update_subresource(&mut self, buffer: &Self::Buffer, data: &[u8]);

    /// Clears the targets, binds the draw state and records one indexed draw.
    fn draw_indexed(
        &mut self,
        draw: &DrawIndexed<'_, Self>,
    ) -> std::result::Result<(), SurfaceErrorAction>;

    /// Presents the frame recorded by the last `draw_indexed`.
    fn present(&mut self);
}

/// Binding class of a buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    /// Immutable vertex data.
    Vertex,
    /// Immutable index data.
    Index,
    /// Shader-visible uniform block, overwritten through `update_subresource`.
    Constant,
}

/// Buffer creation parameters.
#[derive(Debug, Copy, Clone)]
pub struct BufferDesc<'a> {
    pub label: &'static str,
    pub kind: BufferKind,
    pub size: u64,
    /// Initial contents; must be exactly `size` bytes when present.
    pub contents: Option<&'a [u8]>,
}

/// One per-vertex attribute of the input layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InputElement {
    /// Semantic name, for diagnostics.
    pub semantic: &'static str,
    pub location: u32,
    pub format: wgpu::VertexFormat,
    /// Byte offset inside the vertex struct.
    pub offset: u64,
}

/// Inputs to pipeline creation.
pub struct PipelineDesc<'a, B: GpuBackend + ?Sized> {
    pub vertex_shader: &'a B::VertexShader,
    pub input_layout: &'a B::InputLayout,
    pub pixel_shader: &'a B::PixelShader,
    /// Bound to vertex-stage slots 0, 1 and 2.
    pub constant_buffers: [&'a B::Buffer; 3],
}

/// Clear values applied at the start of a frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearValues {
    pub color: wgpu::Color,
    pub depth: f32,
    pub stencil: u32,
}

/// One indexed draw against the swap chain's current back buffer.
pub struct DrawIndexed<'a, B: GpuBackend + ?Sized> {
    pub clear: ClearValues,
    pub pipeline: &'a B::Pipeline,
    pub vertex_buffer: &'a B::Buffer,
    pub vertex_stride: u64,
    pub index_buffer: &'a B::Buffer,
    pub index_format: wgpu::IndexFormat,
    pub indices: Range<u32>,
}

/// Checks an input layout against the reflected inputs of a vertex shader.
///
/// Every element must match a shader input by location and format, and every
/// shader input must be fed by an element.
pub fn check_input_signature(elements: &[InputElement], inputs: &[ShaderInput]) -> Result<()> {
    for element in elements {
        let Some(input) = inputs.iter().find(|i| i.location == element.location) else {
            anyhow::bail!(
                "input element {} (location {}) has no matching vertex shader input",
                element.semantic,
                element.location
            );
        };
        anyhow::ensure!(
            input.format == element.format,
            "input element {} is {:?} but the vertex shader expects {:?} at location {}",
            element.semantic,
            element.format,
            input.format,
            element.location
        );
    }

    for input in inputs {
        anyhow::ensure!(
            elements.iter().any(|e| e.location == input.location),
            "vertex shader input @location({}) is not provided by the input layout",
            input.location
        );
    }

    Ok(())
}
