// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Small wrappers for the bind group plumbing the render engine repeats.

pub mod binding_types;
pub mod uniform_buffer;

// Re-export main types
pub use binding_types::*;
pub use uniform_buffer::UniformBuffer;
