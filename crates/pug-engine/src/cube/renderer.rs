use anyhow::{Context, Result};
use glam::Mat4;

use crate::device::{ClearValues, GpuBackend, SurfaceErrorAction};
use crate::shader::ShaderPaths;

use super::constants::{
    projection_matrix, view_matrix, world_matrix, ConstantBlock, ConstantBufferSlot,
    DEGREES_PER_SECOND,
};
use super::content::Content;

/// Cornflower blue, the back-buffer clear colour.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 100.0 / 255.0,
    g: 149.0 / 255.0,
    b: 237.0 / 255.0,
    a: 1.0,
};

pub const CLEAR_VALUES: ClearValues = ClearValues {
    color: CLEAR_COLOR,
    depth: 1.0,
    stencil: 0,
};

/// Owns the device and the cube's content and drives one rotating cube.
///
/// Release order is fixed: content (pipeline, constant buffers, index and
/// vertex buffers, input layout, shaders) goes before the device. Both
/// `unload_content` and `cleanup` are idempotent and `Drop` performs whatever
/// teardown is still outstanding.
pub struct CubeRenderer<B: GpuBackend> {
    content: Option<Content<B>>,
    gpu: Option<B>,

    angle_degrees: f32,
    projection: Mat4,
    view: Mat4,
    world: Mat4,
}

impl<B: GpuBackend> CubeRenderer<B> {
    pub fn new(gpu: B) -> Self {
        Self {
            content: None,
            gpu: Some(gpu),
            angle_degrees: 0.0,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
        }
    }

    /// Creates all content objects and uploads the projection.
    ///
    /// On failure nothing is retained and the renderer stays unloaded.
    pub fn load(&mut self, shaders: &ShaderPaths) -> Result<()> {
        anyhow::ensure!(self.content.is_none(), "content is already loaded");
        let gpu = self
            .gpu
            .as_mut()
            .context("cannot load content after the device was released")?;

        let content = Content::load(gpu, shaders)?;

        let (width, height) = gpu.client_size();
        self.projection = projection_matrix(width as f32, height as f32);
        gpu.update_subresource(
            content.constant_buffer(ConstantBufferSlot::Application),
            bytemuck::bytes_of(&ConstantBlock::from(self.projection)),
        );

        self.content = Some(content);
        log::info!("cube content loaded ({width}x{height})");
        Ok(())
    }

    /// Advances the rotation by `dt` seconds and uploads view and world matrices.
    pub fn update(&mut self, dt: f32) {
        self.angle_degrees += DEGREES_PER_SECOND * dt;
        self.view = view_matrix();
        self.world = world_matrix(self.angle_degrees);

        let (Some(gpu), Some(content)) = (self.gpu.as_mut(), self.content.as_ref()) else {
            return;
        };
        gpu.update_subresource(
            content.constant_buffer(ConstantBufferSlot::Frame),
            bytemuck::bytes_of(&ConstantBlock::from(self.view)),
        );
        gpu.update_subresource(
            content.constant_buffer(ConstantBufferSlot::Object),
            bytemuck::bytes_of(&ConstantBlock::from(self.world)),
        );
    }

    /// Clears, draws all 36 indices and presents.
    ///
    /// # Panics
    ///
    /// If the device was released or content is not loaded.
    pub fn render(&mut self) -> std::result::Result<(), SurfaceErrorAction> {
        let gpu = self.gpu.as_mut().expect("render called without a device");
        let content = self
            .content
            .as_ref()
            .expect("render called before content was loaded");

        gpu.draw_indexed(&content.draw_call(CLEAR_VALUES))?;
        gpu.present();
        Ok(())
    }

    /// Releases everything `load` created. Safe to call repeatedly.
    pub fn unload_content(&mut self) {
        if let Some(content) = self.content.take() {
            drop(content);
            log::debug!("cube content unloaded");
        }
    }

    /// Releases the device, after any content still loaded. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        self.unload_content();
        if let Some(gpu) = self.gpu.take() {
            drop(gpu);
            log::debug!("device released");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    pub fn gpu(&self) -> Option<&B> {
        self.gpu.as_ref()
    }

    pub fn gpu_mut(&mut self) -> Option<&mut B> {
        self.gpu.as_mut()
    }

    /// Accumulated rotation; not wrapped.
    pub fn angle_degrees(&self) -> f32 {
        self.angle_degrees
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }
}

impl<B: GpuBackend> Drop for CubeRenderer<B> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
