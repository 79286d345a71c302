//! Bounded pool of live light rays.
//!
//! The pool is insertion ordered: the front is always the oldest ray, so
//! overflow eviction is a `pop_front`. Removal during a tick happens in two
//! passes. The sweep records each doomed index once (a set, so a ray flagged
//! for two reasons is still released once) and the rebuild pass releases
//! the doomed rays while keeping the survivors in order.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec3;

use crate::backend::RenderBackend;
use crate::config::{PhysicsConfig, SimConfig, SpawnConfig, TrailConfig};
use crate::particle::Particle;
use crate::spawn::{self, SpawnContext};
use crate::trail::{self, Fate, TrailState};
use crate::tunables::Tunables;

/// Why a ray left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictReason {
    /// Removed by the simulation after a tick.
    Fate(Fate),
    /// Oldest ray dropped to make room for a new one.
    Overflow,
    /// Pool cleared (trail length change or shutdown).
    Cleared,
    /// Removed explicitly through [`ParticlePool::evict`].
    Manual,
}

/// Cumulative pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Rays created.
    pub spawned: u64,
    /// Rays that fell into the core.
    pub absorbed: u64,
    /// Rays that flew beyond the escape distance.
    pub escaped: u64,
    /// Rays discarded for non-finite state.
    pub corrupted: u64,
    /// Rays evicted to respect capacity.
    pub overflowed: u64,
    /// Rays removed by [`ParticlePool::clear`].
    pub cleared: u64,
    /// Rays removed by [`ParticlePool::evict`].
    pub manual: u64,
}

impl PoolStats {
    /// Total rays removed for any reason.
    pub fn evicted(&self) -> u64 {
        self.absorbed + self.escaped + self.corrupted + self.overflowed + self.cleared + self.manual
    }

    fn record(&mut self, reason: EvictReason) {
        match reason {
            EvictReason::Fate(Fate::Absorbed) => self.absorbed += 1,
            EvictReason::Fate(Fate::Escaped) => self.escaped += 1,
            EvictReason::Fate(Fate::Corrupted) => self.corrupted += 1,
            EvictReason::Overflow => self.overflowed += 1,
            EvictReason::Cleared => self.cleared += 1,
            EvictReason::Manual => self.manual += 1,
        }
    }
}

/// What happened during one [`ParticlePool::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Rays that survived and were pushed to the backend.
    pub updated: usize,
    /// Rays removed by the tick.
    pub removed: usize,
}

/// Bounded, insertion-ordered collection of live rays.
#[derive(Debug)]
pub struct ParticlePool {
    particles: VecDeque<Particle>,
    capacity: usize,
    physics: PhysicsConfig,
    spawn: SpawnConfig,
    trail: TrailConfig,
    point_size: f32,
    next_id: u64,
    stats: PoolStats,
}

impl ParticlePool {
    /// Create an empty pool using the constants in `config`.
    pub fn new(config: &SimConfig) -> Self {
        let capacity = config.spawn.max_particles.max(1);
        Self {
            particles: VecDeque::with_capacity(capacity),
            capacity,
            physics: config.physics,
            spawn: config.spawn,
            trail: config.trail,
            point_size: config.render.point_size,
            next_id: 0,
            stats: PoolStats::default(),
        }
    }

    /// Number of live rays.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether no rays are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Maximum number of live rays.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cumulative counters.
    #[inline]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Live rays, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    /// Live ray by id.
    pub fn get(&self, id: u64) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id() == id)
    }

    /// Spawn a ray at a random point on the spawn ring.
    ///
    /// Returns the new ray's id.
    pub fn spawn<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        tunables: &Tunables,
        ctx: &mut SpawnContext,
    ) -> u64 {
        let position = ctx.ray_position(&self.spawn);
        self.spawn_at(backend, tunables, position)
    }

    /// Spawn a ray at `position` with the standard initial velocity.
    ///
    /// At capacity the oldest ray is evicted first.
    pub fn spawn_at<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        tunables: &Tunables,
        position: Vec3,
    ) -> u64 {
        while self.particles.len() >= self.capacity {
            match self.particles.pop_front() {
                Some(oldest) => self.release(backend, oldest, EvictReason::Overflow),
                None => break,
            }
        }

        let len = tunables.trail_length.max(1) as usize;
        let velocity = spawn::initial_velocity(position, &self.spawn);
        let trail_state = TrailState::new(len, position, tunables.head_color, self.trail.vertex_alpha);
        let opacity = trail::opacity(position.length(), &self.trail);

        let handle = backend.create_drawable(len);
        backend.update_drawable(&handle, trail_state.positions(), trail_state.colors());
        backend.set_size(&handle, self.point_size);
        backend.set_opacity(&handle, opacity);
        backend.add_to_scene(&handle);

        let id = self.next_id;
        self.next_id += 1;
        self.stats.spawned += 1;
        tracing::trace!(id, drawable = handle.id(), ?position, "spawned ray");

        self.particles
            .push_back(Particle::new(id, position, velocity, trail_state, opacity, handle));
        id
    }

    /// Advance every live ray by one tick and remove the ones that are done.
    pub fn tick<B: RenderBackend>(&mut self, backend: &mut B, tunables: &Tunables) -> TickReport {
        let mut doomed: BTreeMap<usize, Fate> = BTreeMap::new();

        for (index, particle) in self.particles.iter_mut().enumerate() {
            match particle.step(tunables, &self.physics, &self.trail) {
                Some(fate) => {
                    doomed.entry(index).or_insert(fate);
                }
                None => {
                    let trail_state = particle.trail();
                    backend.update_drawable(particle.handle(), trail_state.positions(), trail_state.colors());
                    backend.set_opacity(particle.handle(), particle.opacity());
                }
            }
        }

        let removed = doomed.len();
        if removed > 0 {
            let all = std::mem::take(&mut self.particles);
            let mut survivors = VecDeque::with_capacity(self.capacity);
            for (index, particle) in all.into_iter().enumerate() {
                match doomed.get(&index) {
                    Some(&fate) => self.release(backend, particle, EvictReason::Fate(fate)),
                    None => survivors.push_back(particle),
                }
            }
            self.particles = survivors;
            tracing::debug!(
                removed,
                live = self.particles.len(),
                absorbed = self.stats.absorbed,
                escaped = self.stats.escaped,
                corrupted = self.stats.corrupted,
                "tick evicted rays"
            );
        }

        TickReport {
            updated: self.particles.len(),
            removed,
        }
    }

    /// Remove the ray with `id`, releasing its drawable.
    ///
    /// Returns `false` when no such ray is live.
    pub fn evict<B: RenderBackend>(&mut self, backend: &mut B, id: u64) -> bool {
        let Some(index) = self.particles.iter().position(|p| p.id() == id) else {
            return false;
        };
        match self.particles.remove(index) {
            Some(particle) => {
                self.release(backend, particle, EvictReason::Manual);
                true
            }
            None => false,
        }
    }

    /// Remove every ray, releasing all drawables. Returns how many were removed.
    pub fn clear<B: RenderBackend>(&mut self, backend: &mut B) -> usize {
        let count = self.particles.len();
        while let Some(particle) = self.particles.pop_front() {
            self.release(backend, particle, EvictReason::Cleared);
        }
        count
    }

    fn release<B: RenderBackend>(&mut self, backend: &mut B, particle: Particle, reason: EvictReason) {
        tracing::trace!(id = particle.id(), ?reason, "evicting ray");
        self.stats.record(reason);
        let handle = particle.into_handle();
        backend.remove_from_scene(&handle);
        backend.destroy_drawable(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DrawableStore;

    fn pool_with_capacity(capacity: usize) -> ParticlePool {
        let mut config = SimConfig::default();
        config.spawn.max_particles = capacity;
        ParticlePool::new(&config)
    }

    #[test]
    fn test_spawn_registers_drawable() {
        let mut pool = pool_with_capacity(10);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        let id = pool.spawn_at(&mut store, &tunables, Vec3::new(30.0, 0.0, 0.0));

        let particle = pool.get(id).unwrap();
        let drawable = store.get(particle.handle().id()).unwrap();
        assert!(drawable.visible);
        assert_eq!(drawable.positions.len(), tunables.trail_length as usize);
        assert_eq!(drawable.size, 0.7);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut pool = pool_with_capacity(2);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        let mut ctx = SpawnContext::seeded(3);

        let first = pool.spawn(&mut store, &tunables, &mut ctx);
        let first_drawable = pool.get(first).unwrap().handle().id();
        let second = pool.spawn(&mut store, &tunables, &mut ctx);
        let third = pool.spawn(&mut store, &tunables, &mut ctx);

        let ids: Vec<u64> = pool.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![second, third]);
        assert!(!store.is_live(first_drawable));
        assert_eq!(store.destroyed(), 1);
        assert_eq!(pool.stats().overflowed, 1);
    }

    #[test]
    fn test_fate_uses_distance_before_the_step() {
        let mut pool = pool_with_capacity(10);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        // just outside the absorb radius (2.5); one step carries it inside
        let id = pool.spawn_at(&mut store, &tunables, Vec3::new(2.55, 0.0, 0.0));

        let first = pool.tick(&mut store, &tunables);
        assert_eq!(first.removed, 0);
        assert!(pool.get(id).unwrap().position().length() < 2.5);

        let second = pool.tick(&mut store, &tunables);
        assert_eq!(second.removed, 1);
        assert_eq!(pool.stats().absorbed, 1);
    }

    #[test]
    fn test_tick_removes_absorbed() {
        let mut pool = pool_with_capacity(10);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        let inside = pool.spawn_at(&mut store, &tunables, Vec3::new(1.0, 0.0, 0.0));
        let outside = pool.spawn_at(&mut store, &tunables, Vec3::new(30.0, 0.0, 0.0));

        let report = pool.tick(&mut store, &tunables);
        assert_eq!(report, TickReport { updated: 1, removed: 1 });
        assert!(pool.get(inside).is_none());
        assert!(pool.get(outside).is_some());
        assert_eq!(pool.stats().absorbed, 1);
        assert_eq!(store.live(), 1);
    }

    #[test]
    fn test_tick_removes_escaped_without_skipping_neighbors() {
        let mut pool = pool_with_capacity(10);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        let a = pool.spawn_at(&mut store, &tunables, Vec3::new(80.0, 0.0, 0.0));
        let b = pool.spawn_at(&mut store, &tunables, Vec3::new(90.0, 0.0, 0.0));
        let c = pool.spawn_at(&mut store, &tunables, Vec3::new(30.0, 0.0, 0.0));
        let before = pool.get(c).unwrap().position();

        pool.tick(&mut store, &tunables);
        assert!(pool.get(a).is_none());
        assert!(pool.get(b).is_none());
        assert_ne!(pool.get(c).unwrap().position(), before);
        assert_eq!(pool.stats().escaped, 2);
        assert_eq!(store.destroyed(), 2);
    }

    #[test]
    fn test_manual_evict_is_single_shot() {
        let mut pool = pool_with_capacity(10);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        let id = pool.spawn_at(&mut store, &tunables, Vec3::new(30.0, 0.0, 0.0));

        assert!(pool.evict(&mut store, id));
        assert!(!pool.evict(&mut store, id));
        assert_eq!(store.destroyed(), 1);
        assert_eq!(pool.stats().manual, 1);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut pool = pool_with_capacity(10);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        let mut ctx = SpawnContext::seeded(11);
        for _ in 0..5 {
            pool.spawn(&mut store, &tunables, &mut ctx);
        }

        assert_eq!(pool.clear(&mut store), 5);
        assert!(pool.is_empty());
        assert_eq!(store.live(), 0);
        assert_eq!(pool.stats().cleared, 5);
        assert_eq!(pool.stats().evicted(), 5);
    }

    #[test]
    fn test_ids_are_unique_across_evictions() {
        let mut pool = pool_with_capacity(1);
        let mut store = DrawableStore::new();
        let tunables = Tunables::default();
        let a = pool.spawn_at(&mut store, &tunables, Vec3::new(30.0, 0.0, 0.0));
        let b = pool.spawn_at(&mut store, &tunables, Vec3::new(30.0, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(pool.len(), 1);
    }
}
