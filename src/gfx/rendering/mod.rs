//! Core rendering functionality
//!
//! Pipelines, shaders and frame rendering.

pub mod pipelines;
pub mod render_engine;

// Re-export main types
pub use pipelines::PipelineConfig;
pub use render_engine::RenderEngine;
