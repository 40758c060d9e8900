//! Render pipeline construction
//!
//! Two pipelines share the [`Vertex3D`] layout: the lit room pipeline and the
//! depth-only shadow pipeline.

use wgpu::*;

use crate::gfx::{resources::TextureResource, scene::vertex::Vertex3D};

pub const ROOM_SHADER: &str = include_str!("room.wgsl");
pub const SHADOW_SHADER: &str = include_str!("shadow.wgsl");

/// Parameters for [`create_pipeline`]
#[derive(Debug, Clone)]
pub struct PipelineConfig<'a> {
    pub label: &'a str,
    pub bind_group_layouts: Vec<&'a BindGroupLayout>,
    /// `None` builds a depth-only pipeline
    pub color_format: Option<TextureFormat>,
    pub depth_bias: DepthBiasState,
    pub sample_count: u32,
}

impl<'a> PipelineConfig<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            bind_group_layouts: Vec::new(),
            color_format: None,
            depth_bias: DepthBiasState::default(),
            sample_count: 1,
        }
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<&'a BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Must match the sample count of every attachment the pipeline draws into
    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count.max(1);
        self
    }

    pub fn with_color_target(mut self, format: TextureFormat) -> Self {
        self.color_format = Some(format);
        self
    }

    pub fn with_depth_bias(mut self, constant: i32, slope_scale: f32) -> Self {
        self.depth_bias = DepthBiasState {
            constant,
            slope_scale,
            clamp: 0.0,
        };
        self
    }
}

/// Builds a pipeline from `shader`, which must export `vs_main` and, for
/// pipelines with a color target, `fs_main`.
pub fn create_pipeline(device: &Device, shader: &ShaderModule, config: &PipelineConfig) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(&format!("{} Layout", config.label)),
        bind_group_layouts: &config.bind_group_layouts,
        push_constant_ranges: &[],
    });

    let color_targets = [config.color_format.map(|format| ColorTargetState {
        format,
        blend: Some(BlendState::REPLACE),
        write_mask: ColorWrites::ALL,
    })];
    let fragment = config.color_format.map(|_| FragmentState {
        module: shader,
        entry_point: Some("fs_main"),
        targets: &color_targets,
        compilation_options: PipelineCompilationOptions::default(),
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(config.label),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc()],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment,
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: config.depth_bias,
        }),
        multisample: MultisampleState {
            count: config.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

pub fn create_shader(device: &Device, label: &str, source: &str) -> ShaderModule {
    device.create_shader_module(ShaderModuleDescriptor {
        label: Some(label),
        source: ShaderSource::Wgsl(source.into()),
    })
}

/// Picks the MSAA sample count to render with.
///
/// `allowed` lists the counts the adapter supports for every attachment.
/// Falls back to the largest allowed count below `requested`, or 1.
pub fn choose_sample_count(requested: u32, allowed: &[u32]) -> u32 {
    if requested <= 1 {
        return 1;
    }
    if allowed.contains(&requested) {
        return requested;
    }
    allowed
        .iter()
        .copied()
        .filter(|&count| count > 1 && count < requested)
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_count_is_kept_when_supported() {
        assert_eq!(choose_sample_count(4, &[1, 2, 4, 8]), 4);
        assert_eq!(choose_sample_count(8, &[1, 2, 4, 8]), 8);
    }

    #[test]
    fn test_unsupported_count_falls_back() {
        assert_eq!(choose_sample_count(8, &[1, 4]), 4);
        assert_eq!(choose_sample_count(4, &[1]), 1);
        assert_eq!(choose_sample_count(4, &[]), 1);
    }

    #[test]
    fn test_disabled_antialiasing_is_single_sampled() {
        assert_eq!(choose_sample_count(0, &[1, 4]), 1);
        assert_eq!(choose_sample_count(1, &[1, 4]), 1);
    }

    #[test]
    fn test_sample_count_is_at_least_one() {
        let config = PipelineConfig::new("room").with_sample_count(0);
        assert_eq!(config.sample_count, 1);
        assert_eq!(PipelineConfig::new("shadow").sample_count, 1);
    }
}
