//! Perspective camera with a free position and quaternion orientation
//!
//! The camera looks down its local -Z axis with +Y up, so an identity
//! orientation faces the -Z world direction.

use cgmath::*;

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
    /// World up, used by `look_at` and by the navigation rig
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for PerspectiveCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        let target = eye + self.forward();
        let view = Matrix4::look_at_rh(eye, target, self.local_up());
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            position: config.home_position,
            orientation: Quaternion::one(),
            up: Vector3::unit_y(),
            aspect,
            fovy: Deg(config.fov_y_degrees).into(),
            znear: config.znear,
            zfar: config.zfar,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    /// World-space viewing direction, unit length
    pub fn forward(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(-Vector3::unit_z())
    }

    /// Camera-local up in world space
    pub fn local_up(&self) -> Vector3<f32> {
        self.orientation.rotate_vector(Vector3::unit_y())
    }

    /// Orients the camera so it faces `target`.
    ///
    /// Does nothing when the target coincides with the camera or lies
    /// straight above or below it.
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let dir = target - self.position;
        if dir.magnitude2() <= f32::EPSILON {
            return;
        }
        let back = -dir.normalize();
        let side = self.up.cross(back);
        if side.magnitude2() <= f32::EPSILON {
            return;
        }
        let side = side.normalize();
        let up = back.cross(side);
        self.orientation = Quaternion::from(Matrix3::from_cols(side, up, back)).normalize();
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.position.x, self.position.y, self.position.z, 1.0];
        self.uniform.view_proj = self.build_view_projection_matrix().into();
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::<f32>::identity().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn test_identity_orientation_faces_negative_z() {
        let camera = PerspectiveCamera::new(&CameraConfig::default(), 1.5);
        assert!(approx(camera.forward(), Vector3::new(0.0, 0.0, -1.0)));
        assert!(approx(camera.local_up(), Vector3::unit_y()));
    }

    #[test]
    fn test_look_at_turns_toward_target() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        camera.position = Vector3::new(0.0, 0.0, 0.0);
        camera.look_at(Vector3::new(3.0, 0.0, 0.0));
        assert!(approx(camera.forward(), Vector3::unit_x()));

        // Straight up is degenerate and leaves the orientation alone
        camera.look_at(Vector3::new(0.0, 10.0, 0.0));
        assert!(approx(camera.forward(), Vector3::unit_x()));
    }

    #[test]
    fn test_resize_projection_sets_aspect() {
        let mut camera = PerspectiveCamera::new(&CameraConfig::default(), 1.0);
        camera.resize_projection(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
    }
}
