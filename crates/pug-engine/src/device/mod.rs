//! GPU device, immediate context and swap chain.
//!
//! This module is responsible for:
//! - the `GpuBackend` capability consumed by the renderer
//! - creating the wgpu Instance/Adapter/Device/Queue and the Surface (swap chain)
//! - the depth-stencil target, rasterizer state and viewport
//! - acquiring, drawing and presenting frames

mod backend;
mod error;
mod gpu;
mod init;
mod surface;
mod viewport;

pub use backend::{
    check_input_signature, BufferDesc, BufferKind, ClearValues, DrawIndexed, GpuBackend,
    InputElement, PipelineDesc,
};
pub use error::SurfaceErrorAction;
pub use gpu::{Gpu, GpuPipeline, ShaderObject, VertexLayout};
pub use init::{present_mode_for, GpuInit};
pub use surface::DEPTH_FORMAT;
pub use viewport::Viewport;
