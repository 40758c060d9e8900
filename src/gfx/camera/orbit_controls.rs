use cgmath::*;

use super::perspective_camera::PerspectiveCamera;
use crate::config::OrbitConfig;

/// Spherical orbit around a target point.
///
/// The controls don't own the camera. Each `update` reads the camera's
/// offset from `target`, applies pending zoom and the distance/polar bounds,
/// and writes the camera back only when something moved.
#[derive(Debug, Clone, Copy)]
pub struct OrbitControls {
    pub target: Vector3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub bounds: OrbitBounds,
    zoom_scale: f32,
    // ln of the radius factor still to be applied
    pending_zoom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl OrbitControls {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            target: Vector3::zero(),
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            bounds: OrbitBounds {
                min_distance: config.min_distance,
                max_distance: config.max_distance,
                min_polar: config.min_polar_angle,
                max_polar: config.max_polar_angle,
            },
            zoom_scale: config.zoom_scale,
            pending_zoom: 0.0,
        }
    }

    /// Wheel input; positive notches move toward the target.
    pub fn zoom(&mut self, notches: f32) {
        if notches > 0.0 {
            self.dolly_in();
        } else if notches < 0.0 {
            self.dolly_out();
        }
    }

    pub fn dolly_in(&mut self) {
        self.pending_zoom += self.zoom_scale.ln();
    }

    pub fn dolly_out(&mut self) {
        self.pending_zoom -= self.zoom_scale.ln();
    }

    pub fn has_pending_zoom(&self) -> bool {
        self.pending_zoom != 0.0
    }

    /// Re-applies the orbit constraints to `camera`.
    ///
    /// Returns true when the camera was moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let spherical = Spherical::from_offset(offset);

        let step = if self.enable_damping {
            self.pending_zoom * self.damping_factor
        } else {
            self.pending_zoom
        };
        self.pending_zoom -= step;
        if self.pending_zoom.abs() < 1e-6 {
            self.pending_zoom = 0.0;
        }

        let mut constrained = spherical;
        constrained.radius = (spherical.radius * step.exp())
            .clamp(self.bounds.min_distance, self.bounds.max_distance);
        constrained.phi = spherical.phi.clamp(self.bounds.min_polar, self.bounds.max_polar);

        if constrained == spherical {
            return false;
        }

        camera.position = self.target + constrained.to_offset();
        camera.look_at(self.target);
        true
    }
}

/// Radius, polar angle from +Y and azimuth around Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}
