//! Surface materials
//!
//! A [`Material`] is plain data owned by its mesh. The render engine turns it
//! into a [`MaterialUniform`] when the mesh is uploaded.

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    /// 1.0 when the vertex color replaces `base_color`
    pub use_vertex_colors: f32,
    /// 1.0 when the shadow map darkens this surface; owned by the mesh
    pub receive_shadow: f32,
}

/// Material definition with PBR properties
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub vertex_colors: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            vertex_colors: false,
        }
    }
}

impl Material {
    /// Creates a new material with basic PBR properties
    ///
    /// # Arguments
    /// * `name` - Name for this material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            vertex_colors: false,
        }
    }

    /// Builder pattern: take the albedo from the vertex colors
    pub fn with_vertex_colors(mut self) -> Self {
        self.vertex_colors = true;
        self
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            metallic: self.metallic,
            roughness: self.roughness,
            use_vertex_colors: if self.vertex_colors { 1.0 } else { 0.0 },
            receive_shadow: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors_are_clamped() {
        let material = Material::new("shiny", [1.0; 4], 3.0, -1.0);
        assert_eq!(material.metallic, 1.0);
        assert_eq!(material.roughness, 0.0);
    }

    #[test]
    fn test_uniform_flags_vertex_colors() {
        let plain = Material::default().uniform();
        assert_eq!(plain.use_vertex_colors, 0.0);

        let painted = Material::default().with_vertex_colors().uniform();
        assert_eq!(painted.use_vertex_colors, 1.0);
        assert_eq!(std::mem::size_of::<MaterialUniform>() % 16, 0);
    }
}
