use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

/// Dear ImGui context wired to the window and the render engine's device
pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
    frame_ready: bool,
}

impl UiManager {
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Default);

        let font_size = (16.0 * window.scale_factor()) as f32;
        context.io_mut().font_global_scale = (1.0 / window.scale_factor()) as f32;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
            frame_ready: false,
        }
    }

    /// Feeds an input event to ImGui.
    ///
    /// Returns true when ImGui wants the mouse or keyboard for itself, in
    /// which case the event should not reach the viewer.
    pub fn handle_input(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Focused(_)
            | WindowEvent::Resized(_)
            | WindowEvent::ScaleFactorChanged { .. } => {
                let ui_event: Event<()> = Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                self.platform
                    .handle_event(self.context.io_mut(), window, &ui_event);

                let io = self.context.io();
                match event {
                    WindowEvent::KeyboardInput { .. } => io.want_capture_keyboard,
                    WindowEvent::MouseInput { .. } | WindowEvent::MouseWheel { .. } => {
                        io.want_capture_mouse
                    }
                    // Moves and window changes always reach the viewer too
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Builds this frame's UI; call before [`UiManager::render`]
    pub fn update_logic<F>(&mut self, window: &Window, run_ui: F)
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(error) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Failed to prepare UI frame: {}", error);
            return;
        }

        let ui = self.context.frame();
        run_ui(ui);
        self.frame_ready = true;

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }
    }

    /// Draws the last built frame over `color_attachment`
    pub fn render(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        if !std::mem::take(&mut self.frame_ready) {
            return;
        }
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // Preserve 3D scene
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(error) = self.renderer.render(draw_data, queue, device, &mut render_pass) {
            log::error!("Failed to render UI: {}", error);
        }
    }

    /// Builds and draws the UI in one go
    pub fn draw<F>(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        color_attachment: &TextureView,
        run_ui: F,
    ) where
        F: FnOnce(&imgui::Ui),
    {
        self.update_logic(window, run_ui);
        self.render(device, queue, encoder, color_attachment);
    }
}
