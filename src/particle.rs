//! A single light ray.

use glam::Vec3;

use crate::backend::DrawableHandle;
use crate::config::{PhysicsConfig, TrailConfig};
use crate::integrator::{self, Kinematics};
use crate::trail::{self, Fate, TrailState};
use crate::tunables::Tunables;

/// One light ray: kinematics, trail buffers and its drawable.
#[derive(Debug)]
pub struct Particle {
    id: u64,
    start_position: Vec3,
    position: Vec3,
    velocity: Vec3,
    trail: TrailState,
    opacity: f32,
    handle: DrawableHandle,
}

impl Particle {
    pub(crate) fn new(
        id: u64,
        start: Vec3,
        velocity: Vec3,
        trail: TrailState,
        opacity: f32,
        handle: DrawableHandle,
    ) -> Self {
        Self {
            id,
            start_position: start,
            position: start,
            velocity,
            trail,
            opacity,
            handle,
        }
    }

    /// Pool-assigned id, unique for the lifetime of the pool.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Where the ray entered the simulation.
    #[inline]
    pub fn start_position(&self) -> Vec3 {
        self.start_position
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Trail buffers.
    #[inline]
    pub fn trail(&self) -> &TrailState {
        &self.trail
    }

    /// Opacity computed on the last tick.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The drawable this ray owns.
    #[inline]
    pub fn handle(&self) -> &DrawableHandle {
        &self.handle
    }

    /// Advance physics and trail by one tick.
    ///
    /// Returns the reason this ray should be removed, if any.
    pub(crate) fn step(
        &mut self,
        tunables: &Tunables,
        physics: &PhysicsConfig,
        trail_config: &TrailConfig,
    ) -> Option<Fate> {
        // shading and fate follow the distance the forces were computed from
        let distance = self.position.length();
        let next = integrator::integrate(
            Kinematics {
                position: self.position,
                velocity: self.velocity,
            },
            tunables,
            physics,
        );
        self.position = next.position;
        self.velocity = next.velocity;

        if !self.position.is_finite() || !self.velocity.is_finite() {
            return Some(Fate::Corrupted);
        }

        self.trail
            .update(self.position, self.velocity, distance, tunables, trail_config);
        self.opacity = trail::opacity(distance, trail_config);

        if !self.trail.is_finite() {
            return Some(Fate::Corrupted);
        }
        trail::fate(distance, trail_config)
    }

    /// Give up ownership of the drawable.
    pub(crate) fn into_handle(self) -> DrawableHandle {
        self.handle
    }
}
