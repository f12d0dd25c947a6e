use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a registered light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LightId(pub Uuid);

impl LightId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LightId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a registered camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CameraId(pub Uuid);

impl CameraId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CameraId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque handle to a compiled and linked shader program owned by a
/// graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderProgram(pub u64);

/// Opaque handle to a GPU-resident buffer owned by a graphics device.
/// Buffers are transient: uploaded for a draw, released with the draw state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferHandle(pub u64);

/// Spatial transform: position, rotation, scale.
///
/// Zero or non-finite scale components are not rejected; they degenerate
/// triangles silently at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local-to-world matrix: translate(position) ∘ rotate(rotation) ∘ scale(scale).
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Render-target dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_uniqueness() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn model_matrix_applies_translate_rotate_scale_in_order() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        // Local +X scales to (2,0,0), rotates about Y to (0,0,-2), then translates.
        let p = t.model_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn zero_scale_is_not_rejected() {
        let t = Transform {
            scale: Vec3::ZERO,
            ..Default::default()
        };
        // Degenerates geometry rather than erroring.
        let p = t.model_matrix().transform_point3(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(p, Vec3::ZERO);
    }

    #[test]
    fn viewport_aspect_ratio() {
        let v = Viewport::new(1920, 1080);
        assert_eq!(v.aspect_ratio(), 1920.0 / 1080.0);
    }
}
