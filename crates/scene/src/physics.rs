use glam::Vec3;
use lantern_common::Transform;

/// Constant-acceleration Euler integrator for a scene object.
///
/// `velocity += acceleration * dt; position += velocity * dt` per tick.
/// Defaults to standard gravity on the Y axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityBody {
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

pub const GRAVITY: f32 = -9.81;

impl Default for GravityBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            acceleration: Vec3::new(0.0, GRAVITY, 0.0),
        }
    }
}

impl GravityBody {
    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Default::default()
        }
    }

    /// Advance one Euler step, mutating the owning object's transform.
    pub fn tick(&mut self, transform: &mut Transform, dt: f32) {
        self.velocity += self.acceleration * dt;
        transform.position += self.velocity * dt;
    }
}
