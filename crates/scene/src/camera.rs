use glam::{Mat4, Vec3};
use lantern_common::{CameraId, ShaderProgram, Viewport};

/// A perspective camera with its own viewport.
///
/// Rotation is Euler angles (radians), not a quaternion: the view matrix
/// composes rotateX ∘ rotateY ∘ rotateZ and then translates by the
/// negated position, in exactly that order. The composition order is part
/// of the engine's rendering contract; do not replace it with a
/// look-at or quaternion form.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub id: CameraId,
    pub position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub viewport: Viewport,
    /// Per-camera default program, consulted after the mesh's own
    /// program and before the engine default.
    pub shader_program: Option<ShaderProgram>,
}

impl Camera {
    pub fn new(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            id: CameraId::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov,
            aspect_ratio,
            near,
            far,
            viewport: Viewport::default(),
            shader_program: None,
        }
    }

    /// Resize the render target. Updates the aspect ratio to `w / h`;
    /// fov, near and far are untouched.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.aspect_ratio = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_translation(-self.position)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_viewport_updates_aspect_only() {
        let mut cam = Camera::default();
        let (fov, near, far) = (cam.fov, cam.near, cam.far);
        cam.set_viewport(1024, 512);
        assert_eq!(cam.aspect_ratio, 2.0);
        assert_eq!(cam.viewport, Viewport::new(1024, 512));
        assert_eq!(cam.fov, fov);
        assert_eq!(cam.near, near);
        assert_eq!(cam.far, far);
    }

    #[test]
    fn view_matrix_rotates_before_translating() {
        let mut cam = Camera::default();
        cam.position = Vec3::new(1.0, 2.0, 3.0);
        cam.rotation = Vec3::new(0.3, 0.5, 0.7);
        let expected = Mat4::from_rotation_x(0.3)
            * Mat4::from_rotation_y(0.5)
            * Mat4::from_rotation_z(0.7)
            * Mat4::from_translation(-cam.position);
        assert_eq!(cam.view_matrix(), expected);
    }

    #[test]
    fn identity_view_at_origin() {
        let cam = Camera::default();
        assert_eq!(cam.view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn view_translation_is_negated_position() {
        let mut cam = Camera::default();
        cam.position = Vec3::new(0.0, 0.0, 5.0);
        let p = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn projection_is_valid_perspective() {
        let cam = Camera::default();
        let m = cam.projection_matrix();
        assert!(!m.col(0).x.is_nan());
        assert_eq!(m.col(3).w, 0.0);
    }
}
