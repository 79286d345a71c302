//! Force integration for a single light ray.
//!
//! The model is a stylized pull toward the origin plus an in-plane swirl:
//!
//! | Term | Magnitude | Direction |
//! |------|-----------|-----------|
//! | Gravity | `G / d² * pull` | toward the origin |
//! | Tangential | `K / d * pull` | radial (XY) rotated 90° |
//!
//! After the forces are applied the speed is capped, the depth component is
//! damped so rays settle into the XY plane, and the position takes one
//! unit-time Euler step. Nothing here is random.

use glam::Vec3;

use crate::config::PhysicsConfig;
use crate::tunables::Tunables;

/// Kinematic state advanced by [`integrate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Current position.
    pub position: Vec3,
    /// Current velocity (distance per tick).
    pub velocity: Vec3,
}

/// Distance from `position` to the core, never below `epsilon`.
#[inline]
pub fn distance_to_core(position: Vec3, epsilon: f32) -> f32 {
    position.length().max(epsilon)
}

/// Unit vector perpendicular to the in-plane radial direction.
///
/// Zero when `position` lies on the Z axis.
#[inline]
pub fn tangent_direction(position: Vec3) -> Vec3 {
    let radial = Vec3::new(position.x, position.y, 0.0).normalize_or_zero();
    Vec3::new(-radial.y, radial.x, 0.0)
}

/// Advance one particle by a single tick.
pub fn integrate(state: Kinematics, tunables: &Tunables, physics: &PhysicsConfig) -> Kinematics {
    let Kinematics { mut position, mut velocity } = state;
    let distance = distance_to_core(position, physics.distance_epsilon);

    let gravity = physics.gravity / (distance * distance) * tunables.pull_strength;
    velocity += (-position).normalize_or_zero() * gravity;

    let swirl = physics.tangential / distance * tunables.pull_strength;
    velocity += tangent_direction(position) * swirl;

    velocity = velocity.clamp_length_max(physics.max_speed);
    velocity.z *= physics.depth_damping;

    position += velocity;
    Kinematics { position, velocity }
}
