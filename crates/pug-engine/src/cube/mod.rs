//! The rotating cube: geometry, per-slot constants and the load/update/render lifecycle.

mod constants;
mod content;
mod geometry;
mod renderer;

pub use constants::{
    projection_matrix, view_matrix, world_matrix, ConstantBlock, ConstantBufferSlot,
    DEGREES_PER_SECOND, EYE_POSITION, FAR_PLANE, FIELD_OF_VIEW_DEGREES, FOCUS_POINT, NEAR_PLANE,
    ROTATION_AXIS, UP_DIRECTION,
};
pub use content::Content;
pub use geometry::{
    index_bytes, vertex_bytes, Vertex, CUBE_INDICES, CUBE_VERTICES, INDEX_FORMAT, INPUT_ELEMENTS,
};
pub use renderer::{CubeRenderer, CLEAR_COLOR, CLEAR_VALUES};
