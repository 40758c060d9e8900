//! Global uniform bindings for camera and lighting
//!
//! Group 0 of both pipelines. The main pass sees the uniform buffer plus the
//! shadow map and its comparison sampler; the shadow pass writes into that
//! map, so it gets a uniform-only group over the same buffer.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

use crate::{
    config::LightingConfig,
    gfx::{
        camera::{perspective_camera::OPENGL_TO_WGPU_MATRIX, CameraUniform},
        resources::texture_resource::TextureResource,
    },
    wgpu_utils::{binding_types, UniformBuffer},
};

/// Per-frame data shared by every draw.
///
/// Must match `Globals` in the WGSL shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    /// Unit vector pointing from the scene toward the sun
    sun_direction: [f32; 3],
    sun_intensity: f32,
    sun_color: [f32; 3],
    ambient_intensity: f32,
    ambient_color: [f32; 3],
    _padding: f32,
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// View-projection of the sun, fitted to a sphere of `radius` around the
/// origin.
pub fn light_view_proj(lighting: &LightingConfig, radius: f32) -> Matrix4<f32> {
    let radius = radius.max(1.0);
    let sun = Vector3::from(lighting.sun_position);
    let distance = sun.magnitude().max(2.0 * radius);
    let direction = if sun.magnitude2() > 0.0 {
        sun.normalize()
    } else {
        Vector3::unit_y()
    };
    // Looking straight down needs a different up vector
    let up = if direction.cross(Vector3::unit_y()).magnitude2() < 1e-6 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    };

    let eye = Point3::new(0.0, 0.0, 0.0) + direction * distance;
    let view = Matrix4::look_at_rh(eye, Point3::new(0.0, 0.0, 0.0), up);
    let proj = cgmath::ortho(
        -radius,
        radius,
        -radius,
        radius,
        (distance - radius).max(0.1),
        distance + radius,
    );
    OPENGL_TO_WGPU_MATRIX * proj * view
}

/// Writes camera and lighting state into the global uniform buffer
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    lighting: &LightingConfig,
    shadow_radius: f32,
) {
    let sun = Vector3::from(lighting.sun_position);
    let sun_direction = if sun.magnitude2() > 0.0 {
        sun.normalize()
    } else {
        Vector3::unit_y()
    };

    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        light_view_proj: light_view_proj(lighting, shadow_radius).into(),
        sun_direction: sun_direction.into(),
        sun_intensity: lighting.sun_intensity,
        sun_color: lighting.sun_color,
        ambient_intensity: lighting.ambient_intensity,
        ambient_color: lighting.ambient_color,
        _padding: 0.0,
    };

    ubo.update_content(queue, content);
}

pub struct GlobalBindings {
    layout: wgpu::BindGroupLayout,
    shadow_pass_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    shadow_pass_bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO, shadow_map: &TextureResource) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[
                binding_types::rendering_entry(0, binding_types::uniform()),
                binding_types::rendering_entry(1, binding_types::texture_depth_2d()),
                binding_types::rendering_entry(
                    2,
                    binding_types::sampler(wgpu::SamplerBindingType::Comparison),
                ),
            ],
        });
        let shadow_pass_layout = binding_types::single_uniform_layout(
            device,
            "Shadow Pass Globals Layout",
            wgpu::ShaderStages::VERTEX,
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_map.sampler),
                },
            ],
        });
        let shadow_pass_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Pass Globals Bind Group"),
            layout: &shadow_pass_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self {
            layout,
            shadow_pass_layout,
            bind_group,
            shadow_pass_bind_group,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn shadow_pass_layout(&self) -> &wgpu::BindGroupLayout {
        &self.shadow_pass_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn shadow_pass_bind_group(&self) -> &wgpu::BindGroup {
        &self.shadow_pass_bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};

    #[test]
    fn test_uniform_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 192);
    }

    #[test]
    fn test_origin_projects_inside_shadow_map() {
        let lighting = LightingConfig::default();
        let clip = light_view_proj(&lighting, 5.0) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_overhead_sun_is_not_degenerate() {
        let lighting = LightingConfig {
            sun_position: [0.0, 10.0, 0.0],
            ..Default::default()
        };
        let matrix = light_view_proj(&lighting, 3.0);
        let clip = matrix * Vector4::new(1.0, 0.0, 1.0, 1.0);
        assert!(!clip.x.is_nan() && !clip.y.is_nan());
        assert!(clip.truncate() != Vector3::zero());
    }
}
