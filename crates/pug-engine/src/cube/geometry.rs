//! Fixed cube mesh.

use bytemuck::{Pod, Zeroable};

use crate::device::InputElement;

/// Position + colour vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    /// Byte size of one vertex, used as the vertex buffer stride.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// Cube corners; each colour channel follows one positive axis.
pub const CUBE_VERTICES: [Vertex; 8] = [
    Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0, 0.0]), // 0
    Vertex::new([-1.0, 1.0, -1.0], [0.0, 1.0, 0.0]),  // 1
    Vertex::new([1.0, 1.0, -1.0], [1.0, 1.0, 0.0]),   // 2
    Vertex::new([1.0, -1.0, -1.0], [1.0, 0.0, 0.0]),  // 3
    Vertex::new([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0]),  // 4
    Vertex::new([-1.0, 1.0, 1.0], [0.0, 1.0, 1.0]),   // 5
    Vertex::new([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]),    // 6
    Vertex::new([1.0, -1.0, 1.0], [1.0, 0.0, 1.0]),   // 7
];

/// Two clockwise triangles per face.
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3, // front  (-z)
    4, 6, 5, 4, 7, 6, // back   (+z)
    4, 5, 1, 4, 1, 0, // left   (-x)
    3, 2, 6, 3, 6, 7, // right  (+x)
    1, 5, 6, 1, 6, 2, // top    (+y)
    4, 0, 3, 4, 3, 7, // bottom (-y)
];

pub const INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint16;

/// Attributes of [`Vertex`], bound to vertex shader locations 0 and 1.
pub const INPUT_ELEMENTS: [InputElement; 2] = [
    InputElement {
        semantic: "POSITION",
        location: 0,
        format: wgpu::VertexFormat::Float32x3,
        offset: std::mem::offset_of!(Vertex, position) as u64,
    },
    InputElement {
        semantic: "COLOR",
        location: 1,
        format: wgpu::VertexFormat::Float32x3,
        offset: std::mem::offset_of!(Vertex, color) as u64,
    },
];

pub fn vertex_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&CUBE_VERTICES)
}

pub fn index_bytes() -> &'static [u8] {
    bytemuck::cast_slice(&CUBE_INDICES)
}
