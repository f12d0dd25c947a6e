//! Rendering core: device-agnostic interface, shader generation, and the
//! per-frame render pass.
//!
//! # Invariants
//! - The render pass never mutates scene registries; registration order is
//!   draw order.
//! - No attribute, buffer, or program binding survives a draw call.
//! - A broken shader program skips its own draw only; the frame continues.
//!
//! The [`GraphicsDevice`] trait is the seam between the engine and the
//! rasterization API. [`RecordingDevice`] is the headless implementation
//! used by tests and the CLI; the wgpu backend lives in
//! `lantern-render-wgpu`.

mod device;
mod engine;
mod recording;
pub mod shader;

pub use device::GraphicsDevice;
pub use engine::{CLEAR_COLOR, Engine};
pub use recording::{DeviceCall, RecordingDevice};

/// Errors from graphics-resource creation and use.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("shader compile/link failure: {0}")]
    ShaderCompile(String),
    #[error("unknown or unlinked shader program: {0:?}")]
    InvalidProgram(lantern_common::ShaderProgram),
    #[error("graphics context creation failure: {0}")]
    GraphicsInit(String),
    #[error(transparent)]
    Asset(#[from] lantern_assets::AssetError),
}

pub fn crate_info() -> &'static str {
    "lantern-render v0.1.0"
}
