//! Scene entities for the lantern engine.
//!
//! Positioned entities embed a [`Transform`] value; lights carry a tagged
//! [`LightKind`] variant instead of a class hierarchy. Cameras are the one
//! deliberate asymmetry: they rotate with Euler angles (the view-matrix
//! composition order is load-bearing), while objects rotate with
//! quaternions.
//!
//! [`Transform`]: lantern_common::Transform

mod camera;
mod geometry;
mod light;
mod object;
mod physics;

pub use camera::Camera;
pub use geometry::cube_source;
pub use light::{Light, LightKind};
pub use object::{GameObject, Mesh};
pub use physics::GravityBody;

pub fn crate_info() -> &'static str {
    "lantern-scene v0.1.0"
}
