//! Procedural vertex coloring
//!
//! Every mesh of a freshly loaded model gets a four-color gradient baked into
//! its vertex colors. The gradient follows the order vertices appear in the
//! buffer, not their position in space, so each mesh runs from red at its
//! first vertex toward a yellow-tinted blend at its last.

use super::object::{Mesh, Model};
use crate::gfx::resources::material::Material;

pub const RED: [f32; 3] = [1.0, 0.0, 0.0];
pub const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
pub const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
pub const YELLOW: [f32; 3] = [1.0, 1.0, 0.0];

const PAINTED_ROUGHNESS: f32 = 0.5;
const PAINTED_METALNESS: f32 = 0.0;

fn lerp(from: [f32; 3], to: [f32; 3], alpha: f32) -> [f32; 3] {
    [
        from[0] + (to[0] - from[0]) * alpha,
        from[1] + (to[1] - from[1]) * alpha,
        from[2] + (to[2] - from[2]) * alpha,
    ]
}

/// Color of vertex `index` out of `count`.
///
/// The three blends run in a fixed order with fixed weights; swapping them
/// changes the result. An empty mesh has no gradient, so `count == 0`
/// yields the start color.
pub fn gradient_color(index: usize, count: usize) -> [f32; 3] {
    if count == 0 {
        return RED;
    }
    let t = index as f32 / count as f32;
    let color = lerp(RED, GREEN, t);
    let color = lerp(color, BLUE, t * 0.5);
    lerp(color, YELLOW, t * 0.25)
}

/// One gradient color per vertex, in buffer order
pub fn gradient_colors(count: usize) -> Vec<[f32; 3]> {
    (0..count).map(|i| gradient_color(i, count)).collect()
}

/// Bakes the gradient into `mesh` and switches it to a vertex-colored
/// standard material that casts and receives shadows.
pub fn paint_mesh(mesh: &mut Mesh) {
    let count = mesh.vertex_count();
    if count == 0 {
        return;
    }
    mesh.set_vertex_colors(&gradient_colors(count));
    mesh.material = Material::new(
        &format!("{} (gradient)", mesh.name),
        [1.0, 1.0, 1.0, 1.0],
        PAINTED_METALNESS,
        PAINTED_ROUGHNESS,
    )
    .with_vertex_colors();
    mesh.cast_shadow = true;
    mesh.receive_shadow = true;
}

/// Paints each mesh of `model` independently
pub fn paint_model(model: &mut Model) {
    for mesh in model.meshes.iter_mut() {
        paint_mesh(mesh);
    }
    log::debug!("Painted {} meshes of '{}'", model.meshes.len(), model.name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(vertex_count: usize) -> Mesh {
        let positions: Vec<f32> = (0..vertex_count)
            .flat_map(|i| [i as f32, 0.0, (i % 2) as f32])
            .collect();
        let normals: Vec<f32> = (0..vertex_count).flat_map(|_| [0.0, 1.0, 0.0]).collect();
        Mesh::new("strip", &positions, &normals, Vec::new())
    }

    #[test]
    fn test_first_vertex_is_red() {
        assert_eq!(gradient_color(0, 7), RED);
    }

    #[test]
    fn test_zero_count_is_finite() {
        assert_eq!(gradient_color(0, 0), RED);
        assert_eq!(gradient_color(3, 0), RED);
        assert!(gradient_colors(0).is_empty());
    }

    #[test]
    fn test_midpoint_matches_blend_chain() {
        // t = 0.5: (0.5, 0.5, 0) -> toward blue by 0.25 -> toward yellow by 0.125
        assert_eq!(gradient_color(1, 2), [0.453125, 0.453125, 0.21875]);
    }

    #[test]
    fn test_blend_order_matters() {
        let t = 0.75;
        let reordered = lerp(lerp(lerp(RED, GREEN, t), YELLOW, t * 0.25), BLUE, t * 0.5);
        assert_ne!(gradient_color(3, 4), reordered);
    }

    #[test]
    fn test_paint_installs_colors_and_material() {
        let mut mesh = strip(4);
        paint_mesh(&mut mesh);

        let colors: Vec<[f32; 3]> = mesh.vertices().iter().map(|v| v.color).collect();
        assert_eq!(colors, gradient_colors(4));
        assert!(mesh.material.vertex_colors);
        assert_eq!(mesh.material.roughness, 0.5);
        assert_eq!(mesh.material.metallic, 0.0);
        assert!(mesh.cast_shadow && mesh.receive_shadow);
    }

    #[test]
    fn test_empty_mesh_is_untouched() {
        let mut mesh = strip(0);
        let before = mesh.material.clone();
        paint_mesh(&mut mesh);
        assert_eq!(mesh.material, before);
        assert!(!mesh.cast_shadow);
    }

    #[test]
    fn test_meshes_get_independent_gradients() {
        let mut model = Model::new("two", vec![strip(3), strip(5)]);
        paint_model(&mut model);
        assert_eq!(model.meshes[0].vertices()[0].color, RED);
        assert_eq!(model.meshes[1].vertices()[0].color, RED);
        assert_eq!(model.meshes[1].vertices()[2].color, gradient_color(2, 5));
    }
}
