use cgmath::{Matrix4, Rad};

use super::object::Model;

/// Scene node holding the loaded room.
///
/// Its only transform is a yaw rotation, driven by pointer drags.
pub struct RoomGroup {
    rotation_y: f32,
    pub models: Vec<Model>,
}

impl Default for RoomGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomGroup {
    pub fn new() -> Self {
        Self {
            rotation_y: 0.0,
            models: Vec::new(),
        }
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn rotate_y(&mut self, delta: f32) {
        self.rotation_y += delta;
    }

    pub fn add(&mut self, model: Model) {
        self.models.push(model);
    }

    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_angle_y(Rad(self.rotation_y))
    }

    pub fn vertex_count(&self) -> usize {
        self.models.iter().map(Model::vertex_count).sum()
    }
}
