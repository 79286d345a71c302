//! Spawn placement for new light rays.
//!
//! Rays enter on a ring around the core in the XY plane, with a little
//! depth scatter, moving mostly tangentially with a slight inward lean.

use crate::config::SpawnConfig;
use crate::integrator::tangent_direction;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random source for spawn placement.
///
/// Seed it explicitly for reproducible runs; [`SpawnContext::from_entropy`]
/// differs on every program execution.
#[derive(Debug, Clone)]
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a context seeded from the wall clock.
    pub fn from_entropy() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    // ========== Random primitives ==========

    /// Random f32 in `[min, max)`, or `min` when the range is empty.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    // ========== Position helpers ==========

    /// Random point on a ring in the XY plane.
    ///
    /// * `radius` - Ring center radius
    /// * `jitter` - Radius varies uniformly within `radius ± jitter`
    /// * `z_spread` - Total height of the Z band, centered on 0
    pub fn random_on_ring(&mut self, radius: f32, jitter: f32, z_spread: f32) -> Vec3 {
        let r = self.random_range(radius - jitter, radius + jitter);
        let theta = self.rng.gen_range(0.0..TAU);
        let half = z_spread * 0.5;
        Vec3::new(r * theta.cos(), r * theta.sin(), self.random_range(-half, half))
    }

    /// Random spawn position for a light ray.
    pub fn ray_position(&mut self, config: &SpawnConfig) -> Vec3 {
        self.random_on_ring(config.spawn_radius, config.radius_jitter, config.z_spread)
    }
}

/// Initial velocity for a ray entering at `position`.
///
/// Tangential at `orbit_speed` plus an inward radial component at
/// `inward_speed`, both in the XY plane.
pub fn initial_velocity(position: Vec3, config: &SpawnConfig) -> Vec3 {
    let radial = Vec3::new(position.x, position.y, 0.0).normalize_or_zero();
    tangent_direction(position) * config.orbit_speed - radial * config.inward_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_positions_stay_in_band() {
        let config = SpawnConfig::default();
        let mut ctx = SpawnContext::seeded(7);
        for _ in 0..500 {
            let p = ctx.ray_position(&config);
            let r = Vec3::new(p.x, p.y, 0.0).length();
            assert!(r >= config.spawn_radius - config.radius_jitter - 1e-3);
            assert!(r <= config.spawn_radius + config.radius_jitter + 1e-3);
            assert!(p.z.abs() <= config.z_spread * 0.5);
        }
    }

    #[test]
    fn test_seeded_contexts_agree() {
        let config = SpawnConfig::default();
        let mut a = SpawnContext::seeded(99);
        let mut b = SpawnContext::seeded(99);
        for _ in 0..10 {
            assert_eq!(a.ray_position(&config), b.ray_position(&config));
        }
    }

    #[test]
    fn test_empty_range_returns_min() {
        let mut ctx = SpawnContext::seeded(1);
        assert_eq!(ctx.random_range(2.0, 2.0), 2.0);
        let p = ctx.random_on_ring(10.0, 0.0, 0.0);
        assert!((Vec3::new(p.x, p.y, 0.0).length() - 10.0).abs() < 1e-4);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn test_initial_velocity_components() {
        let config = SpawnConfig::default();
        let v = initial_velocity(Vec3::new(30.0, 0.0, 0.5), &config);
        assert!((v.x + config.inward_speed).abs() < 1e-7);
        assert!((v.y - config.orbit_speed).abs() < 1e-7);
        assert_eq!(v.z, 0.0);
    }
}
