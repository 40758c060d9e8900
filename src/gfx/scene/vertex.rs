//! # Vertex Data Structures
//!
//! GPU-compatible vertex format used by every mesh in the viewer.

/// A 3D vertex with position, normal and color.
///
/// `#[repr(C)]` keeps the layout stable for direct upload with `bytemuck`.
///
/// # Examples
///
/// ```no_run
/// use roomwalk::gfx::scene::vertex::Vertex3D;
///
/// let vertex = Vertex3D {
///     position: [0.0, 1.0, 0.0],
///     normal: [0.0, 1.0, 0.0],
///     color: [1.0, 0.0, 0.0],
/// };
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
    /// Linear RGB, only read by vertex-colored materials
    pub color: [f32; 3],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: position (Float32x3)
    /// - Attribute 1: normal (Float32x3)
    /// - Attribute 2: color (Float32x3)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
