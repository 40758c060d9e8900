//! # Graphics Module
//!
//! Everything between a loaded OBJ file and pixels on screen.
//!
//! ## Architecture Overview
//!
//! - **Loading** ([`loader`]) - Background OBJ parsing with progress events
//! - **Camera System** ([`camera`]) - Perspective camera, orbit controls, keyboard rig and drag rotation
//! - **Scene Management** ([`scene`]) - Room group, models, meshes and the vertex-color painter
//! - **Rendering Pipeline** ([`rendering`]) - Shadow-mapped forward rendering
//! - **Resource Management** ([`resources`]) - Materials, depth targets and global uniforms
//!
//! ## Usage
//!
//! ```no_run
//! use roomwalk::gfx::{loader::{LoadEvent, ModelLoader}, scene::painter};
//!
//! let mut handle = ModelLoader::load("RoomObj.obj");
//! while let Some(event) = handle.poll_event() {
//!     if let LoadEvent::Loaded(mut model) = event {
//!         painter::paint_model(&mut model);
//!     }
//! }
//! ```

pub mod camera;
pub mod loader;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::{NavigationRig, OrbitControls, PerspectiveCamera};
pub use loader::{LoadEvent, LoadHandle, ModelLoader};
pub use rendering::render_engine::RenderEngine;
