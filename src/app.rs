use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::ViewerConfig,
    gfx::rendering::RenderEngine,
    ui::{draw_hud, UiManager},
    viewer::{FrameClock, Viewer},
};

/// The windowed room viewer
pub struct RoomApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    viewer: Viewer,
    clock: FrameClock,
    /// First fatal error; stops the event loop
    error: Option<anyhow::Error>,
}

impl RoomApp {
    pub fn new(config: ViewerConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new()?;
        let viewer = Viewer::new(&config);

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                viewer,
                clock: FrameClock::new(),
                error: None,
            },
        })
    }

    /// Opens the window and runs until it is closed
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.app_state)?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.config.window_size;
        let window = event_loop.create_window(
            WindowAttributes::default()
                .with_title("roomwalk")
                .with_inner_size(LogicalSize::new(width, height)),
        )?;
        let window_handle = Arc::new(window);

        let PhysicalSize { width, height } = window_handle.inner_size();
        let window_clone = window_handle.clone();
        let lighting = self.config.lighting;
        let msaa_samples = self.config.msaa_samples;
        let renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, msaa_samples, &lighting).await
        })?;

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window_handle,
        );

        self.viewer.resize(width, height);
        self.viewer.start_loading();
        self.clock.reset();

        self.window = Some(window_handle);
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        let dt = self.clock.tick();
        let report = self.viewer.tick(dt);
        render_engine.prepare(&mut self.viewer.scene);

        let status = self.viewer.status().clone();
        let stats = self.viewer.scene.get_statistics();
        let mut reset_requested = false;

        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => render_engine.render_frame_with_ui(
                &self.viewer.scene,
                |device, queue, encoder, color_attachment| {
                    ui_manager.draw(device, queue, encoder, window, color_attachment, |ui| {
                        reset_requested = draw_hud(ui, &report, &status, &stats).reset_camera;
                    });
                },
            ),
            None => render_engine.render_frame(
                &self.viewer.scene,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };

        if reset_requested {
            self.viewer.reset();
        }

        if let Err(error) = result {
            self.fail(event_loop, anyhow::Error::new(error).context("Failed to render frame"));
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(error) = self.init_graphics(event_loop) {
            self.fail(event_loop, error.context("Failed to start the viewer"));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_input(&window, window_id, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if self.viewer.resize(width, height) {
                    if let Some(render_engine) = self.render_engine.as_mut() {
                        render_engine.resize(width, height);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                self.viewer.handle_window_event(&other);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
