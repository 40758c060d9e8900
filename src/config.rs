//! Viewer configuration
//!
//! Every tunable of the viewer lives in [`ViewerConfig`]. The defaults are the
//! values the viewer ships with; the binary overrides the asset path, the
//! initial window size and the antialiasing sample count from the command line.

use std::path::PathBuf;

use cgmath::Vector3;
use clap::Parser;

/// Command line arguments of the `roomwalk` binary
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// OBJ file with the room to load
    #[arg(default_value = "RoomObj.obj")]
    pub asset: PathBuf,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// MSAA samples per pixel; 1 disables antialiasing
    #[arg(long, default_value_t = 4)]
    pub msaa: u32,
}

/// Camera projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Where the camera starts and where a reset puts it back
    pub home_position: Vector3<f32>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            znear: 0.1,
            zfar: 1000.0,
            home_position: Vector3::new(0.0, 2.0, 6.0),
        }
    }
}

/// Orbit control limits and damping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    /// π/2 keeps the camera from dipping below the horizon
    pub max_polar_angle: f32,
    /// Radius factor applied per wheel notch
    pub zoom_scale: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.1,
            min_distance: 1.0,
            max_distance: 50.0,
            min_polar_angle: 0.0,
            max_polar_angle: std::f32::consts::FRAC_PI_2,
            zoom_scale: 0.95,
        }
    }
}

/// Keyboard and pointer navigation speeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationConfig {
    /// Units per second
    pub move_speed: f32,
    /// Radians per second
    pub rotate_speed: f32,
    /// Radians of room rotation per pixel of horizontal drag
    pub drag_sensitivity: f32,
    /// Distance of the orbit target in front of the camera
    pub look_ahead: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotate_speed: 2.0,
            drag_sensitivity: 0.01,
            look_ahead: 5.0,
        }
    }
}

/// Ambient plus one shadow-casting directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingConfig {
    pub background: [f32; 3],
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub sun_position: [f32; 3],
    pub shadow_map_size: u32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            // 0xaaaaaa
            background: [170.0 / 255.0; 3],
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.8,
            sun_color: [1.0, 1.0, 1.0],
            sun_intensity: 0.7,
            sun_position: [5.0, 10.0, 7.0],
            shadow_map_size: 2048,
        }
    }
}

/// Model import normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportConfig {
    /// Bounding box diagonals longer than this get scaled down
    pub oversize_threshold: f32,
    pub oversize_scale: f32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            oversize_threshold: 100.0,
            oversize_scale: 0.1,
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub asset_path: PathBuf,
    pub window_size: (u32, u32),
    /// Requested MSAA sample count; the renderer lowers it to what the
    /// adapter supports
    pub msaa_samples: u32,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub navigation: NavigationConfig,
    pub lighting: LightingConfig,
    pub import: ImportConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from("RoomObj.obj"),
            window_size: (1200, 800),
            msaa_samples: 4,
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            navigation: NavigationConfig::default(),
            lighting: LightingConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        Self {
            asset_path: args.asset,
            window_size: (args.width.max(1), args.height.max(1)),
            msaa_samples: args.msaa.max(1),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["roomwalk"]);
        let config = ViewerConfig::from(args);
        assert_eq!(config.asset_path, PathBuf::from("RoomObj.obj"));
        assert_eq!(config.window_size, (1200, 800));
        assert_eq!(config.orbit.max_distance, 50.0);
        assert_eq!(config.msaa_samples, 4);
    }

    #[test]
    fn test_args_msaa_override() {
        let config = ViewerConfig::from(Args::parse_from(["roomwalk", "--msaa", "0"]));
        assert_eq!(config.msaa_samples, 1);
        let config = ViewerConfig::from(Args::parse_from(["roomwalk", "--msaa", "8"]));
        assert_eq!(config.msaa_samples, 8);
    }

    #[test]
    fn test_args_override_asset_and_size() {
        let args = Args::parse_from(["roomwalk", "/srv/rooms/loft.obj", "--width", "640", "--height", "0"]);
        let config = ViewerConfig::from(args);
        assert_eq!(config.asset_path, PathBuf::from("/srv/rooms/loft.obj"));
        assert_eq!(config.window_size, (640, 1));
    }
}
