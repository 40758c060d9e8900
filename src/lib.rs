//! roomwalk
//!
//! An interactive room viewer built on wgpu and winit. It loads a Wavefront
//! OBJ room in the background, paints every mesh with a vertex-color
//! gradient, and lets you walk through it with the keyboard while dragging
//! the mouse spins the room.
//!
//! ```no_run
//! use roomwalk::{config::ViewerConfig, RoomApp};
//!
//! fn main() -> anyhow::Result<()> {
//!     RoomApp::new(ViewerConfig::default())?.run()
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod ui;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::RoomApp;
pub use viewer::{FrameClock, FrameReport, LoadStatus, Viewer};
