use glam::{Vec2, Vec3};
use lantern_common::{LightId, Transform};

/// Light variants. Area lights carry an emitter size that the shading
/// model stores but never consumes: they contribute as dimensionless
/// omnidirectional sources, with no directional term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Area { size: Vec2 },
}

/// A positioned light. Color channels are nominally 0..1 and intensity is
/// caller-controlled; neither is clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub id: LightId,
    pub transform: Transform,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            id: LightId::new(),
            transform: Transform::default(),
            color,
            intensity,
            kind: LightKind::Directional,
        }
    }

    pub fn area(color: Vec3, intensity: f32, position: Vec3, size: Vec2) -> Self {
        Self {
            id: LightId::new(),
            transform: Transform::from_position(position),
            color,
            intensity,
            kind: LightKind::Area { size },
        }
    }

    /// Forward vector for directional lights: the canonical forward
    /// `(0, 0, -1)` rotated through the light's current orientation.
    /// Area lights have no direction.
    pub fn direction(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional => {
                Some(self.transform.rotation.normalize() * Vec3::new(0.0, 0.0, -1.0))
            }
            LightKind::Area { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn directional_default_orientation_points_forward() {
        let light = Light::directional(Vec3::ONE, 1.0);
        let dir = light.direction().unwrap();
        assert!((dir - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn half_turn_about_y_flips_x_and_z() {
        let mut light = Light::directional(Vec3::ONE, 1.0);
        light.transform.rotation = Quat::from_rotation_y(std::f32::consts::PI);
        let dir = light.direction().unwrap();
        assert!((dir.x - 0.0).abs() < 1e-6);
        assert!((dir.y - 0.0).abs() < 1e-6);
        assert!((dir.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn direction_is_invariant_under_color_and_intensity_changes() {
        let mut light = Light::directional(Vec3::ONE, 1.0);
        light.transform.rotation = Quat::from_rotation_x(0.7);
        let before = light.direction().unwrap();
        light.color = Vec3::new(0.2, 0.9, 0.4);
        light.intensity = 42.0;
        assert_eq!(light.direction().unwrap(), before);
    }

    #[test]
    fn area_lights_have_no_direction() {
        let light = Light::area(Vec3::ONE, 1.0, Vec3::ZERO, Vec2::new(2.0, 1.0));
        assert_eq!(light.direction(), None);
    }

    #[test]
    fn color_and_intensity_are_not_clamped() {
        let light = Light::directional(Vec3::new(4.0, -1.0, 2.0), 1e6);
        assert_eq!(light.color.x, 4.0);
        assert_eq!(light.intensity, 1e6);
    }
}
