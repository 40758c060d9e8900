//! First-person navigation on top of the orbit controls
//!
//! Keyboard flags drive a yaw-only camera: arrows left/right turn, WASD
//! walks on the horizontal plane, arrows up/down fly along world Y. After
//! every step the orbit target is parked a fixed distance in front of the
//! camera so the orbit controls keep agreeing with the first-person view.

use cgmath::*;
use winit::keyboard::KeyCode;

use super::{orbit_controls::OrbitControls, perspective_camera::PerspectiveCamera};
use crate::config::{CameraConfig, NavigationConfig};

/// One flag per logical movement action
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

impl MovementFlags {
    /// Updates the flag bound to `key`.
    ///
    /// Returns false for keys that aren't bound to any flag.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let flag = match key {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.backward,
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            KeyCode::ArrowUp => &mut self.up,
            KeyCode::ArrowDown => &mut self.down,
            KeyCode::ArrowLeft => &mut self.rotate_left,
            KeyCode::ArrowRight => &mut self.rotate_right,
            _ => return false,
        };
        *flag = pressed;
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Normalized local movement intent: z forward, x toward the camera's left.
    pub fn intent(&self) -> Vector3<f32> {
        let mut direction = Vector3::zero();
        if self.forward {
            direction.z += 1.0;
        }
        if self.backward {
            direction.z -= 1.0;
        }
        if self.left {
            direction.x += 1.0;
        }
        if self.right {
            direction.x -= 1.0;
        }
        if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            direction
        }
    }
}

pub struct NavigationRig {
    pub flags: MovementFlags,
    yaw: f32,
    move_speed: f32,
    rotate_speed: f32,
    look_ahead: f32,
    home_position: Vector3<f32>,
}

impl NavigationRig {
    pub fn new(navigation: &NavigationConfig, camera: &CameraConfig) -> Self {
        Self {
            flags: MovementFlags::default(),
            yaw: 0.0,
            move_speed: navigation.move_speed,
            rotate_speed: navigation.rotate_speed,
            look_ahead: navigation.look_ahead,
            home_position: camera.home_position,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn key_down(&mut self, key: KeyCode) -> bool {
        self.flags.set_key(key, true)
    }

    pub fn key_up(&mut self, key: KeyCode) -> bool {
        self.flags.set_key(key, false)
    }

    /// Advances the camera by `dt` seconds and re-syncs the orbit controls.
    pub fn update(&mut self, dt: f32, camera: &mut PerspectiveCamera, controls: &mut OrbitControls) {
        if self.flags.rotate_left {
            self.yaw += self.rotate_speed * dt;
        }
        if self.flags.rotate_right {
            self.yaw -= self.rotate_speed * dt;
        }

        // Y-X-Z euler with zero pitch and roll is a pure Y rotation
        camera.orientation = Quaternion::from_angle_y(Rad(self.yaw));

        let intent = self.flags.intent();
        if intent.magnitude2() > 0.0 {
            let mut forward = camera.forward();
            forward.y = 0.0;
            let forward = forward.normalize();
            let lateral = camera.up.cross(forward).normalize();
            camera.position += forward * (intent.z * self.move_speed * dt);
            camera.position += lateral * (intent.x * self.move_speed * dt);
        }

        if self.flags.up {
            camera.position.y += self.move_speed * dt;
        }
        if self.flags.down {
            camera.position.y -= self.move_speed * dt;
        }

        controls.target = camera.position + camera.forward() * self.look_ahead;
        controls.update(camera);
    }

    /// Puts the camera back at its home position facing -Z, with the orbit
    /// target at the world origin.
    pub fn reset(&mut self, camera: &mut PerspectiveCamera, controls: &mut OrbitControls) {
        self.yaw = 0.0;
        camera.position = self.home_position;
        camera.orientation = Quaternion::from_angle_y(Rad(self.yaw));
        controls.target = Vector3::zero();
        controls.update(camera);
    }
}
