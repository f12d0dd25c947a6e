//! wgpu backend for the lantern graphics-device interface.
//!
//! Maps the GL-flavored device contract onto wgpu: named uniforms are
//! staged into one packed uniform block per draw, named attributes become
//! vertex-buffer slots resolved from the generated WGSL, and each draw is
//! its own render pass that loads the previous contents.
//!
//! # Invariants
//! - Uniform byte offsets follow WGSL uniform-address-space layout; the
//!   block size is derived from the program's light-array bound.
//! - Transient buffers and bindings live until `release_state`, never
//!   across it.

mod device;
mod layout;

pub use device::WgpuDevice;
