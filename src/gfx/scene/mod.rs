//! # Scene Management Module
//!
//! The scene the viewer draws: a perspective camera with its orbit controls,
//! lighting, and the room group holding the loaded model.
//!
//! ## Key Components
//!
//! - [`Scene`] - Camera, controls, lights and viewport size
//! - [`RoomGroup`] - The rotatable node that owns loaded models
//! - [`Model`] / [`Mesh`] - Loaded geometry, materials and GPU buffers
//! - [`painter`] - Vertex-color gradient applied to freshly loaded meshes
//! - [`Vertex3D`] - Vertex format with position, normal and color
//!
//! ## Usage
//!
//! ```no_run
//! use roomwalk::{config::ViewerConfig, gfx::scene::Scene};
//!
//! let mut scene = Scene::new(&ViewerConfig::default());
//! scene.resize(1920, 1080);
//! ```

pub mod object;
pub mod painter;
pub mod room;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{BoundingBox, DrawObject, Mesh, Model};
pub use room::RoomGroup;
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
