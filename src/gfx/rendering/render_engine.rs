//! WGPU-based rendering engine for the room viewer
//!
//! Owns the surface, device and pipelines. Each frame renders the sun's
//! shadow map, then the lit room (multisampled and resolved to the surface
//! when antialiasing is on), then an optional UI overlay on top.

use anyhow::{anyhow, Context};

use crate::{
    config::LightingConfig,
    gfx::{
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
            texture_resource::TextureResource,
        },
        scene::{object::DrawObject, scene::Scene},
    },
    wgpu_utils::binding_types,
};

use super::pipelines::{
    choose_sample_count, create_pipeline, create_shader, PipelineConfig, ROOM_SHADER, SHADOW_SHADER,
};

const TRANSFORM_SLOT: u32 = 1;
const MATERIAL_SLOT: u32 = 2;

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    /// Present only when `sample_count > 1`
    msaa_color: Option<wgpu::TextureView>,
    depth_texture: TextureResource,
    shadow_map: TextureResource,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    room_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`.
    ///
    /// Fails when no adapter or device is available for the surface.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        msaa_samples: u32,
        lighting: &LightingConfig,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // Shaders encode gamma themselves
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface is incompatible with the adapter"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = choose_sample_count(
            msaa_samples,
            &supported_sample_counts(format, device.features()),
        );
        if sample_count != msaa_samples {
            log::warn!("{}x MSAA unsupported for {:?}, using {}x", msaa_samples, format, sample_count);
        }
        let msaa_color = TextureResource::create_msaa_color_view(&device, &config, sample_count);
        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, sample_count, "depth_texture");
        let shadow_size = lighting
            .shadow_map_size
            .min(device.limits().max_texture_dimension_2d);
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_size);

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo, &shadow_map);
        let transform_layout = binding_types::single_uniform_layout(
            &device,
            "Transform Bind Group Layout",
            wgpu::ShaderStages::VERTEX,
        );
        let material_layout = binding_types::single_uniform_layout(
            &device,
            "Material Bind Group Layout",
            wgpu::ShaderStages::FRAGMENT,
        );

        let room_shader = create_shader(&device, "Room Shader", ROOM_SHADER);
        let room_pipeline = create_pipeline(
            &device,
            &room_shader,
            &PipelineConfig::new("Room")
                .with_bind_group_layouts(vec![
                    global_bindings.layout(),
                    &transform_layout,
                    &material_layout,
                ])
                .with_color_target(format)
                .with_sample_count(sample_count),
        );

        let shadow_shader = create_shader(&device, "Shadow Shader", SHADOW_SHADER);
        let shadow_pipeline = create_pipeline(
            &device,
            &shadow_shader,
            &PipelineConfig::new("Shadow")
                .with_bind_group_layouts(vec![
                    global_bindings.shadow_pass_layout(),
                    &transform_layout,
                ])
                .with_depth_bias(2, 2.0),
        );

        let [r, g, b] = lighting.background;
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        log::info!(
            "Render engine ready: {}x{} {:?}, {}x MSAA, shadow map {}",
            config.width,
            config.height,
            format,
            sample_count,
            shadow_size
        );

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            sample_count,
            msaa_color,
            depth_texture,
            shadow_map,
            global_ubo,
            global_bindings,
            transform_layout,
            material_layout,
            room_pipeline,
            shadow_pipeline,
            clear_color,
        })
    }

    /// Uploads newly added models and writes this frame's transforms and
    /// global uniforms.
    pub fn prepare(&mut self, scene: &mut Scene) {
        for model in scene.room.models.iter_mut() {
            if model.needs_upload() {
                model.init_gpu_resources(&self.device, &self.transform_layout, &self.material_layout);
            }
        }

        let parent = scene.room.transform();
        for model in &scene.room.models {
            model.update_transform(&self.queue, parent);
        }

        update_global_ubo(
            &mut self.global_ubo,
            &self.queue,
            scene.camera.uniform,
            &scene.lighting,
            scene.bounding_radius(),
        );
    }

    /// Renders a frame with an optional UI overlay.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for the surface");
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: Shadow map from the sun
        {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, self.global_bindings.shadow_pass_bind_group(), &[]);
            for model in &scene.room.models {
                shadow_pass.draw_model(model, TRANSFORM_SLOT, None);
            }
        }

        // PASS 2: Lit room, resolved into the surface when multisampled
        {
            let (view, resolve_target, store) = match &self.msaa_color {
                Some(msaa_view) => (msaa_view, Some(&surface_texture_view), wgpu::StoreOp::Discard),
                None => (&surface_texture_view, None, wgpu::StoreOp::Store),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.room_pipeline);
            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
            for model in &scene.room.models {
                render_pass.draw_model(model, TRANSFORM_SLOT, Some(MATERIAL_SLOT));
            }
        }

        // PASS 3: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Convenience method for rendering with UI
    pub fn render_frame_with_ui<F>(&mut self, scene: &Scene, ui_callback: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.render_frame(scene, Some(ui_callback))
    }

    /// Reconfigures the surface and recreates the depth and MSAA buffers.
    ///
    /// Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.msaa_color =
            TextureResource::create_msaa_color_view(&self.device, &self.config, self.sample_count);
        self.depth_texture = TextureResource::create_depth_texture(
            &self.device,
            &self.config,
            self.sample_count,
            "depth_texture",
        );
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}

/// Sample counts usable for both the color and the depth attachment.
///
/// Only the counts the format guarantees without adapter-specific features
/// are considered, since the device is created with default features.
fn supported_sample_counts(color_format: wgpu::TextureFormat, features: wgpu::Features) -> Vec<u32> {
    let depth = TextureResource::DEPTH_FORMAT
        .guaranteed_format_features(features)
        .flags;
    color_format
        .guaranteed_format_features(features)
        .flags
        .supported_sample_counts()
        .into_iter()
        .filter(|&count| depth.sample_count_supported(count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_surface_formats_allow_4x() {
        for format in [wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Rgba8Unorm] {
            let counts = supported_sample_counts(format, wgpu::Features::default());
            assert!(counts.contains(&1) && counts.contains(&4), "{format:?}: {counts:?}");
            assert_eq!(choose_sample_count(4, &counts), 4);
        }
    }
}
