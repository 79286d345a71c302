//! Scene driver: spawn cadence, ticking and tunable updates.
//!
//! A [`Scene`] owns the tunables, the pool and the backend, and is the only
//! place tunables change. One call to [`Scene::frame`] performs every spawn
//! that came due since the previous frame and then one simulation tick;
//! each step runs to completion before the next begins.

use std::time::Duration;

use crate::backend::RenderBackend;
use crate::config::SimConfig;
use crate::error::{ConfigError, TunableError};
use crate::pool::{ParticlePool, TickReport};
use crate::spawn::SpawnContext;
use crate::time::SpawnClock;
use crate::tunables::{Tunables, TunableUpdate};

/// What one [`Scene::frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Rays spawned this frame.
    pub spawned: u32,
    /// Result of the tick.
    pub tick: TickReport,
}

/// Runs the light-ray simulation against a rendering backend.
pub struct Scene<B: RenderBackend> {
    config: SimConfig,
    tunables: Tunables,
    pool: ParticlePool,
    backend: B,
    spawn_ctx: SpawnContext,
    spawn_clock: SpawnClock,
}

impl<B: RenderBackend> Scene<B> {
    /// Create a scene from a validated config, seeding spawns from the clock.
    pub fn new(config: SimConfig, backend: B) -> Result<Self, ConfigError> {
        Self::with_spawn_context(config, backend, SpawnContext::from_entropy())
    }

    /// Create a scene with reproducible spawn placement.
    pub fn with_seed(config: SimConfig, backend: B, seed: u64) -> Result<Self, ConfigError> {
        Self::with_spawn_context(config, backend, SpawnContext::seeded(seed))
    }

    fn with_spawn_context(
        config: SimConfig,
        backend: B,
        spawn_ctx: SpawnContext,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let pool = ParticlePool::new(&config);
        let spawn_clock = SpawnClock::new(config.spawn.interval(), config.spawn.max_per_frame);
        tracing::debug!(
            max_particles = config.spawn.max_particles,
            interval_ms = config.spawn.interval_ms,
            "scene created"
        );
        Ok(Self {
            tunables: config.tunables,
            config,
            pool,
            backend,
            spawn_ctx,
            spawn_clock,
        })
    }

    /// The configuration this scene was built from.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current tunables.
    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Live rays.
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Rendering backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Rendering backend, mutably (for backend-side bookkeeping such as dirty flags).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Run every spawn due after `delta`, then one tick.
    pub fn frame(&mut self, delta: Duration) -> FrameReport {
        let spawned = self.spawn_clock.advance(delta);
        for _ in 0..spawned {
            self.spawn();
        }
        let tick = self.tick();
        FrameReport { spawned, tick }
    }

    /// Spawn one ray at a random point on the ring. Returns its id.
    pub fn spawn(&mut self) -> u64 {
        self.pool
            .spawn(&mut self.backend, &self.tunables, &mut self.spawn_ctx)
    }

    /// Spawn one ray at `position`. Returns its id.
    pub fn spawn_at(&mut self, position: glam::Vec3) -> u64 {
        self.pool.spawn_at(&mut self.backend, &self.tunables, position)
    }

    /// Advance every ray by one tick.
    pub fn tick(&mut self) -> TickReport {
        self.pool.tick(&mut self.backend, &self.tunables)
    }

    /// Validate and apply one tunable change.
    ///
    /// A trail length change destroys every live ray immediately, since their
    /// buffers were sized for the old length. Returns whether anything changed.
    pub fn update_tunable(&mut self, update: TunableUpdate) -> Result<bool, TunableError> {
        let changed = match self.tunables.apply(update) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!(error = %e, "rejected tunable update");
                return Err(e);
            }
        };

        if changed {
            tracing::info!(?update, "tunable updated");
            if update.requires_restart() {
                let cleared = self.pool.clear(&mut self.backend);
                self.spawn_clock.reset();
                tracing::info!(cleared, "trail length changed, pool restarted");
            }
        }
        Ok(changed)
    }

    /// Release every ray. Call before dropping the backend.
    pub fn shutdown(&mut self) {
        let cleared = self.pool.clear(&mut self.backend);
        let stats = self.pool.stats();
        tracing::info!(
            cleared,
            spawned = stats.spawned,
            absorbed = stats.absorbed,
            escaped = stats.escaped,
            overflowed = stats.overflowed,
            "scene shut down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DrawableStore;
    use glam::Vec3;

    fn scene() -> Scene<DrawableStore> {
        Scene::with_seed(SimConfig::default(), DrawableStore::new(), 5).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.spawn.max_particles = 0;
        assert!(Scene::with_seed(config, DrawableStore::new(), 0).is_err());
    }

    #[test]
    fn test_frame_spawns_on_cadence() {
        let mut scene = scene();
        let report = scene.frame(Duration::from_millis(35));
        assert_eq!(report.spawned, 3);
        assert_eq!(scene.pool().len(), 3);
        assert_eq!(report.tick.updated, 3);
    }

    #[test]
    fn test_frame_without_elapsed_time_only_ticks() {
        let mut scene = scene();
        scene.spawn();
        let before = scene.pool().iter().next().unwrap().position();
        let report = scene.frame(Duration::ZERO);
        assert_eq!(report.spawned, 0);
        assert_ne!(scene.pool().iter().next().unwrap().position(), before);
    }

    #[test]
    fn test_trail_length_change_clears_pool() {
        let mut scene = scene();
        for _ in 0..4 {
            scene.spawn();
        }
        assert!(scene.update_tunable(TunableUpdate::TrailLength(8)).unwrap());
        assert!(scene.pool().is_empty());
        assert_eq!(scene.backend().live(), 0);

        scene.spawn();
        assert!(scene.pool().iter().all(|p| p.trail().len() == 8));
    }

    #[test]
    fn test_same_trail_length_keeps_pool() {
        let mut scene = scene();
        scene.spawn();
        let len = scene.tunables().trail_length;
        assert!(!scene.update_tunable(TunableUpdate::TrailLength(len)).unwrap());
        assert_eq!(scene.pool().len(), 1);
    }

    #[test]
    fn test_color_change_keeps_pool() {
        let mut scene = scene();
        scene.spawn();
        scene
            .update_tunable(TunableUpdate::HeadColor(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(scene.pool().len(), 1);
        assert_eq!(scene.tunables().head_color, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_pull_change_keeps_pool_and_applies_next_tick() {
        let mut scene = scene();
        let id = scene.spawn_at(Vec3::new(30.0, 0.0, 0.0));
        assert!(scene.update_tunable(TunableUpdate::PullStrength(0.0)).unwrap());
        assert_eq!(scene.pool().len(), 1);

        let before = scene.pool().get(id).unwrap();
        let (position, velocity) = (before.position(), before.velocity());
        assert_eq!(velocity.z, 0.0);

        scene.tick();
        let after = scene.pool().get(id).unwrap();
        assert_eq!(after.velocity(), velocity);
        assert_eq!(after.position(), position + velocity);
    }

    #[test]
    fn test_rejected_update_leaves_state() {
        let mut scene = scene();
        scene.spawn();
        assert!(scene.update_tunable(TunableUpdate::TrailLength(0)).is_err());
        assert!(scene.update_tunable(TunableUpdate::PullStrength(-1.0)).is_err());
        assert_eq!(scene.pool().len(), 1);
        assert_eq!(*scene.tunables(), SimConfig::default().tunables);
    }

    #[test]
    fn test_shutdown_releases_all() {
        let mut scene = scene();
        scene.frame(Duration::from_millis(100));
        scene.shutdown();
        assert_eq!(scene.backend().live(), 0);
        assert_eq!(scene.backend().created(), scene.backend().destroyed());
    }
}
