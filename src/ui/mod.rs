//! # User Interface Module
//!
//! Dear ImGui overlay drawn on top of the room.
//!
//! - [`UiManager`] - ImGui context, winit input bridge and wgpu renderer
//! - [`hud`] - Camera readout, load status and the reset button
//!
//! Input ImGui wants for itself (clicks on the HUD, typing into a widget) is
//! kept away from the viewer so dragging a window does not spin the room.

pub mod hud;
pub mod manager;

// Re-export main types
pub use hud::{draw_hud, HudResponse};
pub use manager::UiManager;
