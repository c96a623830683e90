//! Constant-buffer slots and the transforms uploaded into them.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Vertical field of view of the projection, in degrees.
pub const FIELD_OF_VIEW_DEGREES: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

pub const EYE_POSITION: Vec3 = Vec3::new(0.0, 0.0, -10.0);
pub const FOCUS_POINT: Vec3 = Vec3::ZERO;
pub const UP_DIRECTION: Vec3 = Vec3::Y;

/// World rotation axis; normalized before use.
pub const ROTATION_AXIS: Vec3 = Vec3::new(0.0, 1.0, 1.0);

/// Cube spin rate: one full turn every four seconds.
pub const DEGREES_PER_SECOND: f32 = 90.0;

/// Update-frequency tier of a constant buffer. The discriminant is the shader binding slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ConstantBufferSlot {
    /// Projection; written once at load.
    Application = 0,
    /// View; written every tick.
    Frame = 1,
    /// World transform; written every tick.
    Object = 2,
}

impl ConstantBufferSlot {
    pub const ALL: [ConstantBufferSlot; 3] = [
        ConstantBufferSlot::Application,
        ConstantBufferSlot::Frame,
        ConstantBufferSlot::Object,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ConstantBufferSlot::Application => "pug application constants",
            ConstantBufferSlot::Frame => "pug frame constants",
            ConstantBufferSlot::Object => "pug object constants",
        }
    }
}

/// GPU layout of one constant buffer: a single column-major 4x4 matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ConstantBlock {
    pub matrix: [[f32; 4]; 4],
}

impl ConstantBlock {
    pub const SIZE: u64 = std::mem::size_of::<ConstantBlock>() as u64;
}

impl From<Mat4> for ConstantBlock {
    fn from(m: Mat4) -> Self {
        Self {
            matrix: m.to_cols_array_2d(),
        }
    }
}

/// Left-handed perspective projection for a client area of `width` x `height`.
///
/// A zero height is treated as one pixel so the aspect ratio stays finite.
pub fn projection_matrix(width: f32, height: f32) -> Mat4 {
    let aspect = width.max(1.0) / height.max(1.0);
    Mat4::perspective_lh(FIELD_OF_VIEW_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
}

/// Camera at `EYE_POSITION` looking at `FOCUS_POINT`.
pub fn view_matrix() -> Mat4 {
    Mat4::look_at_lh(EYE_POSITION, FOCUS_POINT, UP_DIRECTION)
}

/// Rotation about `ROTATION_AXIS` by `angle_degrees`.
pub fn world_matrix(angle_degrees: f32) -> Mat4 {
    Mat4::from_axis_angle(ROTATION_AXIS.normalize(), angle_degrees.to_radians())
}
