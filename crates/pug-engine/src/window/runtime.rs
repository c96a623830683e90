use std::fmt;

use anyhow::Context;
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::cube::CubeRenderer;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::shader::ShaderPaths;

use super::frame_loop::{FrameLoop, Message};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Client-area size in physical pixels.
    pub client_size: PhysicalSize<u32>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "pug".to_string(),
            client_size: PhysicalSize::new(1280, 720),
            resizable: true,
        }
    }
}

/// Startup step that failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StartupStage {
    Window,
    Device,
    Content,
}

impl StartupStage {
    /// User-facing description of the failure.
    pub fn message(self) -> &'static str {
        match self {
            StartupStage::Window => "Failed to create application window.",
            StartupStage::Device => "Failed to create the GPU device and swap chain.",
            StartupStage::Content => "Failed to load content.",
        }
    }
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A failure in the fixed window → device → content startup sequence.
#[derive(Debug, thiserror::Error)]
#[error("{stage}")]
pub struct StartupError {
    pub stage: StartupStage,
    #[source]
    pub source: anyhow::Error,
}

impl StartupError {
    pub fn new(stage: StartupStage, source: anyhow::Error) -> Self {
        Self { stage, source }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, initializes the device, loads the cube and runs the
    /// frame loop until a quit message arrives.
    ///
    /// Returns the quit payload as exit code. Teardown runs on every path.
    pub fn run(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        shaders: ShaderPaths,
    ) -> Result<i32, StartupError> {
        let event_loop = EventLoop::new()
            .context("failed to create winit event loop")
            .map_err(|e| StartupError::new(StartupStage::Window, e))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = AppState::new(config, gpu_init, shaders);
        let result = event_loop.run_app(&mut app);
        app.teardown();

        if let Some(err) = app.startup_error.take() {
            return Err(err);
        }
        result
            .context("winit event loop terminated with error")
            .map_err(|e| StartupError::new(StartupStage::Window, e))?;

        let code = app.frame_loop.exit_code().unwrap_or(0);
        log::info!("exiting with code {code}");
        Ok(code)
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[not_covariant]
    renderer: CubeRenderer<Gpu<'this>>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    shaders: ShaderPaths,

    entry: Option<WindowEntry>,
    frame_loop: FrameLoop,
    startup_error: Option<StartupError>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, shaders: ShaderPaths) -> Self {
        Self {
            config,
            gpu_init,
            shaders,
            entry: None,
            frame_loop: FrameLoop::default(),
            startup_error: None,
        }
    }

    /// Window, then device and swap chain, then content. Stops at the first failure.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), StartupError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.client_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")
            .map_err(|e| StartupError::new(StartupStage::Window, e))?;

        let gpu_init = self.gpu_init.clone();
        let mut entry = WindowEntry::try_new(window, |window| {
            pollster::block_on(Gpu::new(window, gpu_init)).map(CubeRenderer::new)
        })
        .map_err(|e| StartupError::new(StartupStage::Device, e))?;

        let shaders = &self.shaders;
        entry
            .with_renderer_mut(|renderer| renderer.load(shaders))
            .map_err(|e| StartupError::new(StartupStage::Content, e))?;

        self.entry = Some(entry);
        self.frame_loop = FrameLoop::default();
        Ok(())
    }

    /// Dispatches every pending message.
    fn pump(&mut self, event_loop: &ActiveEventLoop) {
        while let Some(message) = self.frame_loop.next_message() {
            self.dispatch(message);
        }
        if self.frame_loop.is_quit() {
            event_loop.exit();
        }
    }

    fn dispatch(&mut self, message: Message) {
        let Message::Resized { width, height } = message else {
            return;
        };
        if let Some(entry) = self.entry.as_mut() {
            entry.with_renderer_mut(|renderer| {
                if let Some(gpu) = renderer.gpu_mut() {
                    gpu.resize(PhysicalSize::new(width, height));
                }
            });
        }
    }

    /// One update + render pass.
    fn tick(&mut self) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let Some(time) = self.frame_loop.tick() else {
            return;
        };

        let result = entry.with_renderer_mut(|renderer| {
            renderer.update(time.dt);
            renderer.render()
        });

        match result {
            Ok(()) | Err(SurfaceErrorAction::Reconfigured) | Err(SurfaceErrorAction::SkipFrame) => {}
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("fatal surface error; quitting");
                self.frame_loop.post_quit(-1);
            }
        }
    }

    /// Unloads content, then releases the device and window. Idempotent.
    fn teardown(&mut self) {
        let Some(mut entry) = self.entry.take() else {
            return;
        };
        entry.with_renderer_mut(|renderer| {
            renderer.unload_content();
            renderer.cleanup();
        });
        drop(entry);
        log::info!("window closed");
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.startup_error.is_some() {
            return;
        }

        if let Err(err) = self.start(event_loop) {
            log::error!("{err}: {:#}", err.source);
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.frame_loop.post(translate_window_event(&event));
        self.pump(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.pump(event_loop);
        if self.frame_loop.is_quit() {
            return;
        }

        self.tick();
        self.pump(event_loop);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Maps a winit window event onto the message the frame loop consumes.
///
/// A close request destroys the window, which in turn posts `Quit(0)`.
fn translate_window_event(event: &WindowEvent) -> Message {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Message::Destroy,
        WindowEvent::RedrawRequested => Message::Paint,
        WindowEvent::Resized(size) => Message::Resized {
            width: size.width,
            height: size.height,
        },
        _ => Message::Other,
    }
}
