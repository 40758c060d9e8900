pub mod camera_controller;
pub mod navigation;
pub mod orbit_controls;
pub mod perspective_camera;

// Re-export main types
pub use camera_controller::CameraController;
pub use navigation::{MovementFlags, NavigationRig};
pub use orbit_controls::OrbitControls;
pub use perspective_camera::{Camera, CameraUniform, PerspectiveCamera};
