use cgmath::InnerSpace;

use crate::{
    config::{LightingConfig, ViewerConfig},
    gfx::camera::{OrbitControls, PerspectiveCamera},
};

use super::room::RoomGroup;

/// Everything the renderer draws: camera, lights and the room
pub struct Scene {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub room: RoomGroup,
    pub lighting: LightingConfig,
    /// Renderer output size in physical pixels
    pub viewport: (u32, u32),
}

impl Scene {
    pub fn new(config: &ViewerConfig) -> Self {
        let (width, height) = config.window_size;
        Self {
            camera: PerspectiveCamera::new(&config.camera, width as f32 / height as f32),
            controls: OrbitControls::new(&config.orbit),
            room: RoomGroup::new(),
            lighting: config.lighting,
            viewport: (width, height),
        }
    }

    /// Matches the camera projection and the output size to a new viewport.
    ///
    /// Zero-sized viewports (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return false;
        }
        self.camera.resize_projection(width, height);
        self.viewport = (width, height);
        true
    }

    /// Updates the camera matrices
    pub fn update(&mut self) {
        self.camera.update_view_proj();
    }

    /// Radius of a sphere around the origin enclosing every model
    pub fn bounding_radius(&self) -> f32 {
        self.room
            .models
            .iter()
            .filter_map(|model| {
                let bounds = model.bounding_box();
                if bounds.is_empty() {
                    return None;
                }
                let center = (bounds.center() + model.offset) * model.scale;
                Some(center.magnitude() + bounds.diagonal() * model.scale * 0.5)
            })
            .fold(0.0, f32::max)
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let meshes = self.room.models.iter().flat_map(|model| model.meshes.iter());
        let (mesh_count, total_triangles) =
            meshes.fold((0usize, 0u32), |(count, triangles), mesh| {
                (count + 1, triangles + mesh.index_count() / 3)
            });

        SceneStatistics {
            model_count: self.room.models.len(),
            mesh_count,
            total_triangles,
            total_vertices: self.room.vertex_count(),
        }
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub model_count: usize,
    pub mesh_count: usize,
    pub total_triangles: u32,
    pub total_vertices: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_updates_aspect_and_viewport() {
        let mut scene = Scene::new(&ViewerConfig::default());
        assert!(scene.resize(1024, 768));
        assert_eq!(scene.camera.aspect, 1024.0 / 768.0);
        assert_eq!(scene.viewport, (1024, 768));
    }

    #[test]
    fn test_zero_sized_resize_is_ignored() {
        let mut scene = Scene::new(&ViewerConfig::default());
        assert!(!scene.resize(0, 600));
        assert_eq!(scene.viewport, (1200, 800));
        assert_eq!(scene.camera.aspect, 1.5);
    }

    #[test]
    fn test_bounding_radius_of_normalized_model() {
        use crate::{config::ImportConfig, gfx::scene::object::{Mesh, Model}};

        let positions = [10.0, 0.0, 0.0, 12.0, 0.0, 0.0, 10.0, 0.0, 2.0];
        let mut model = Model::new("tri", vec![Mesh::new("tri", &positions, &[], vec![0, 1, 2])]);
        model.normalize(&ImportConfig::default());

        let mut scene = Scene::new(&ViewerConfig::default());
        assert_eq!(scene.bounding_radius(), 0.0);
        scene.room.add(model);
        assert!((scene.bounding_radius() - 2.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_empty_scene_statistics() {
        let scene = Scene::new(&ViewerConfig::default());
        let stats = scene.get_statistics();
        assert_eq!(stats.model_count, 0);
        assert_eq!(stats.total_vertices, 0);
    }
}
