//! Shared value types for the lantern engine.
//!
//! # Invariants
//! - Ids are globally unique (uuid v4) and orderable for deterministic sorting.
//! - `Transform` composition order is fixed: translate ∘ rotate ∘ scale.

mod types;

pub use types::{BufferHandle, CameraId, LightId, ObjectId, ShaderProgram, Transform, Viewport};

pub fn crate_info() -> &'static str {
    "lantern-common v0.1.0"
}
