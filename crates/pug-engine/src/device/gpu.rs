use anyhow::{Context, Result};
use wgpu::SurfaceError;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::shader::{FeatureLevel, ShaderBinary, ShaderInput, ShaderKind};

use super::backend::{
    check_input_signature, BufferDesc, BufferKind, DrawIndexed, GpuBackend, InputElement,
    PipelineDesc,
};
use super::{surface, GpuInit, SurfaceErrorAction, Viewport};

/// A validated shader module on the device.
pub struct ShaderObject {
    kind: ShaderKind,
    module: wgpu::ShaderModule,
    /// Location-bound inputs; empty for pixel shaders.
    inputs: Vec<ShaderInput>,
}

/// Vertex buffer layout checked against a vertex shader's input signature.
pub struct VertexLayout {
    attributes: Vec<wgpu::VertexAttribute>,
    stride: u64,
}

/// Linked render pipeline plus the bind group holding the constant buffers.
pub struct GpuPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    _bind_group_layout: wgpu::BindGroupLayout,
    vertex_stride: u64,
}

/// Back buffer acquired for the frame in flight.
///
/// Holding it blocks acquisition of the next frame; `present` releases it.
struct AcquiredFrame {
    view: wgpu::TextureView,
    surface_texture: wgpu::SurfaceTexture,
}

/// Owns wgpu core objects, the swap chain and the depth-stencil target.
///
/// Fields are declared in release order: swap-chain-dependent objects first
/// (depth-stencil view, render-target view, depth-stencil buffer, depth-stencil
/// state, rasterizer state, swap chain), then the device context (queue), then
/// the device. Dropping a `Gpu` tears everything down in that order.
///
/// The order holds by construction only: fields drop in declaration order and
/// no test can observe it without a device. wgpu reference-counts its objects,
/// so a resource still referenced elsewhere outlives its handle here.
pub struct Gpu<'w> {
    /// Depth-stencil view bound with the back buffer.
    depth_view: wgpu::TextureView,

    /// Render-target view of the acquired back buffer, if a frame is in flight.
    frame: Option<AcquiredFrame>,

    /// Depth-stencil buffer backing `depth_view`.
    depth_texture: wgpu::Texture,

    /// Depth test configuration linked into pipelines.
    depth_stencil_state: wgpu::DepthStencilState,

    /// Fill/cull configuration linked into pipelines.
    rasterizer_state: wgpu::PrimitiveState,

    viewport: Viewport,

    /// Swap chain bound to the window.
    ///
    /// Surface lifetime is tied to the window; the window must outlive the `Gpu`.
    surface: wgpu::Surface<'w>,

    /// Active swap-chain configuration.
    config: wgpu::SurfaceConfiguration,

    /// Immediate submission context.
    queue: wgpu::Queue,

    /// Logical device.
    device: wgpu::Device,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// wgpu instance used to create the adapter and surface.
    _instance: wgpu::Instance,

    window: &'w Window,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    feature_level: FeatureLevel,
}

impl<'w> Gpu<'w> {
    /// Creates the device, immediate context and swap chain for a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let present_mode = init.present_mode();
        let GpuInit {
            vsync: _,
            prefer_srgb,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("pug device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(&surface_caps, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let (depth_texture, depth_view) = surface::create_depth_target(&device, size);
        let feature_level =
            FeatureLevel::from_shader_model(adapter.get_downlevel_capabilities().shader_model);

        let gpu = Self {
            depth_view,
            frame: None,
            depth_texture,
            depth_stencil_state: surface::depth_stencil_state(),
            rasterizer_state: surface::rasterizer_state(),
            viewport: Viewport::full(size.width, size.height),
            surface,
            config,
            queue,
            device,
            adapter,
            _instance: instance,
            window,
            size,
            feature_level,
        };

        let info = gpu.adapter_info();
        log::info!(
            "GPU device created: {} ({:?}), feature level {:?}, {:?}, {present_mode:?}",
            info.name,
            info.backend,
            gpu.feature_level,
            gpu.surface_format()
        );

        Ok(gpu)
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Reconfigures the swap chain and depth-stencil target after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only internal state is updated, frames are skipped and configuration is deferred.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        self.viewport = Viewport::full(new_size.width, new_size.height);
        if !self.viewport.is_valid() {
            return;
        }

        // The in-flight back buffer belongs to the old configuration.
        self.frame = None;

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        let (depth_texture, depth_view) = surface::create_depth_target(&self.device, new_size);
        self.depth_view = depth_view;
        self.depth_texture = depth_texture;

        log::debug!(
            "swap chain resized to {}x{} ({:?})",
            new_size.width,
            new_size.height,
            self.depth_texture.size()
        );
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        log::warn!("surface error: {err}");
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }
}

impl GpuBackend for Gpu<'_> {
    type Buffer = wgpu::Buffer;
    type VertexShader = ShaderObject;
    type PixelShader = ShaderObject;
    type InputLayout = VertexLayout;
    type Pipeline = GpuPipeline;

    fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }

    fn client_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<wgpu::Buffer> {
        anyhow::ensure!(desc.size > 0, "{} has zero size", desc.label);

        let max = self.device.limits().max_buffer_size;
        anyhow::ensure!(
            desc.size <= max,
            "{} is {} bytes, device maximum is {max}",
            desc.label,
            desc.size
        );

        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
            BufferKind::Constant => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        };

        let buffer = match desc.contents {
            Some(contents) => {
                anyhow::ensure!(
                    contents.len() as u64 == desc.size,
                    "{} initial data is {} bytes, expected {}",
                    desc.label,
                    contents.len(),
                    desc.size
                );
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(desc.label),
                        contents,
                        usage,
                    })
            }
            None => {
                // Vertex and index buffers are immutable; without data they would stay empty.
                anyhow::ensure!(
                    desc.kind == BufferKind::Constant,
                    "{} requires initial data",
                    desc.label
                );
                self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(desc.label),
                    size: desc.size,
                    usage,
                    mapped_at_creation: false,
                })
            }
        };

        Ok(buffer)
    }

    fn create_vertex_shader(&mut self, binary: &ShaderBinary) -> Result<ShaderObject> {
        create_shader_object(&self.device, ShaderKind::Vertex, binary)
    }

    fn create_input_layout(
        &mut self,
        elements: &[InputElement],
        stride: u64,
        shader: &ShaderObject,
    ) -> Result<VertexLayout> {
        anyhow::ensure!(
            shader.kind == ShaderKind::Vertex,
            "input layout requires a vertex shader"
        );
        check_input_signature(elements, &shader.inputs)?;

        let attributes = elements
            .iter()
            .map(|e| wgpu::VertexAttribute {
                format: e.format,
                offset: e.offset,
                shader_location: e.location,
            })
            .collect();

        Ok(VertexLayout { attributes, stride })
    }

    fn create_pixel_shader(&mut self, binary: &ShaderBinary) -> Result<ShaderObject> {
        create_shader_object(&self.device, ShaderKind::Pixel, binary)
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_, Self>) -> Result<GpuPipeline> {
        anyhow::ensure!(
            desc.vertex_shader.kind == ShaderKind::Vertex && desc.pixel_shader.kind == ShaderKind::Pixel,
            "pipeline requires a vertex shader and a pixel shader"
        );

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("pug constant buffers bgl"),
                    entries: &[
                        constant_buffer_entry(0),
                        constant_buffer_entry(1),
                        constant_buffer_entry(2),
                    ],
                });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pug constant buffers"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: desc.constant_buffers[0].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: desc.constant_buffers[1].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: desc.constant_buffers[2].as_entire_binding(),
                },
            ],
        });

        let pipeline_layout =
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("pug pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let layout = desc.input_layout;
        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pug cube pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &desc.vertex_shader.module,
                entry_point: Some(ShaderKind::Vertex.entry_point()),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: layout.stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &layout.attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &desc.pixel_shader.module,
                entry_point: Some(ShaderKind::Pixel.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: self.rasterizer_state,
            depth_stencil: Some(self.depth_stencil_state.clone()),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(GpuPipeline {
            pipeline,
            bind_group,
            _bind_group_layout: bind_group_layout,
            vertex_stride: layout.stride,
        })
    }

    fn update_subresource(&mut self, buffer: &wgpu::Buffer, data: &[u8]) {
        self.queue.write_buffer(buffer, 0, data);
    }

    fn draw_indexed(
        &mut self,
        draw: &DrawIndexed<'_, Self>,
    ) -> std::result::Result<(), SurfaceErrorAction> {
        // Minimized: nothing to draw into until the next non-zero resize.
        if !self.viewport.is_valid() {
            return Err(SurfaceErrorAction::SkipFrame);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => return Err(self.handle_surface_error(err)),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        debug_assert_eq!(
            draw.vertex_stride, draw.pipeline.vertex_stride,
            "vertex stride differs from the input layout"
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pug frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pug cube pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(draw.clear.color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(draw.clear.depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(draw.clear.stencil),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let vp = self.viewport;
            rpass.set_pipeline(&draw.pipeline.pipeline);
            rpass.set_bind_group(0, &draw.pipeline.bind_group, &[]);
            rpass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            rpass.set_index_buffer(draw.index_buffer.slice(..), draw.index_format);
            rpass.set_viewport(vp.x, vp.y, vp.width, vp.height, vp.min_depth, vp.max_depth);
            rpass.draw_indexed(draw.indices.clone(), 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.frame = Some(AcquiredFrame {
            view,
            surface_texture,
        });

        Ok(())
    }

    fn present(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        drop(frame.view);
        self.window.pre_present_notify();
        frame.surface_texture.present();
    }
}

fn create_shader_object(
    device: &wgpu::Device,
    kind: ShaderKind,
    binary: &ShaderBinary,
) -> Result<ShaderObject> {
    anyhow::ensure!(
        binary.kind() == kind,
        "{} passed where a {} was expected",
        binary.kind().label(),
        kind.label()
    );

    let validated = binary.validate()?;
    let inputs = match kind {
        ShaderKind::Vertex => validated.inputs()?,
        ShaderKind::Pixel => Vec::new(),
    };

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(kind.label()),
        source: wgpu::ShaderSource::Wgsl(validated.source().into()),
    });

    Ok(ShaderObject {
        kind,
        module,
        inputs,
    })
}

fn constant_buffer_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
