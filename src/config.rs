//! Simulation configuration.
//!
//! Everything the simulation reads that is not a runtime tunable lives here:
//! physics constants, the spawn ring, trail shaping and render cosmetics.
//! A [`SimConfig`] can be saved to and loaded from JSON; every section falls
//! back to its defaults when omitted.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tunables::Tunables;

/// Constants used by the force integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity constant `G` in `G / d^2 * pull`.
    pub gravity: f32,
    /// Tangential constant `K` in `K / d * pull`.
    pub tangential: f32,
    /// Velocity magnitude cap.
    pub max_speed: f32,
    /// Per-tick multiplier on the Z component of velocity.
    pub depth_damping: f32,
    /// Lower bound for distance-to-core in force terms.
    pub distance_epsilon: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.35,
            tangential: 0.0005,
            max_speed: 0.22,
            depth_damping: 0.92,
            distance_epsilon: 1e-3,
        }
    }
}

/// Where and how often particles are created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Maximum number of live particles.
    pub max_particles: usize,
    /// Center radius of the spawn ring.
    pub spawn_radius: f32,
    /// Ring radius varies uniformly in `spawn_radius ± radius_jitter`.
    pub radius_jitter: f32,
    /// Total height of the Z band particles spawn in.
    pub z_spread: f32,
    /// Initial tangential speed.
    pub orbit_speed: f32,
    /// Initial inward radial speed.
    pub inward_speed: f32,
    /// Milliseconds between spawns.
    pub interval_ms: u64,
    /// Upper bound on spawns performed in a single frame.
    pub max_per_frame: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            spawn_radius: 31.0,
            radius_jitter: 1.0,
            z_spread: 1.5,
            orbit_speed: 0.06,
            inward_speed: 0.01,
            interval_ms: 10,
            max_per_frame: 16,
        }
    }
}

impl SpawnConfig {
    /// Spawn interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Trail shaping, fading and removal thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Radius of the black core.
    pub core_radius: f32,
    /// Distance between successive trail targets.
    pub spacing: f32,
    /// Smoothing factor for trail vertex 1.
    pub lag_base: f32,
    /// Smoothing factor increase per trail vertex.
    pub lag_step: f32,
    /// Fade starts at `core_radius * fade_start`.
    pub fade_start: f32,
    /// Fully transparent at `core_radius * fade_end`.
    pub fade_end: f32,
    /// Absorbed below `core_radius * absorb`.
    pub absorb: f32,
    /// Escaped beyond this distance.
    pub escape_distance: f32,
    /// Redshift is zero at and beyond this distance.
    pub redshift_radius: f32,
    /// How far redshift pushes channels at the core.
    pub redshift_strength: f32,
    /// Opacity outside the fade zone.
    pub baseline_opacity: f32,
    /// Per-vertex alpha.
    pub vertex_alpha: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            core_radius: 5.0,
            spacing: 0.05,
            lag_base: 0.2,
            lag_step: 0.01,
            fade_start: 1.0,
            fade_end: 0.7,
            absorb: 0.5,
            escape_distance: 75.0,
            redshift_radius: 30.0,
            redshift_strength: 0.5,
            baseline_opacity: 0.8,
            vertex_alpha: 0.8,
        }
    }
}

impl TrailConfig {
    /// Absolute distance where fading begins.
    #[inline]
    pub fn fade_start_distance(&self) -> f32 {
        self.core_radius * self.fade_start
    }

    /// Absolute distance where a trail becomes invisible.
    #[inline]
    pub fn fade_end_distance(&self) -> f32 {
        self.core_radius * self.fade_end
    }

    /// Absolute distance below which a particle is absorbed.
    #[inline]
    pub fn absorb_distance(&self) -> f32 {
        self.core_radius * self.absorb
    }
}

/// Cosmetic settings for the windowed front end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// World-space size of each trail point.
    pub point_size: f32,
    /// Halo radius as a multiple of the core radius.
    pub halo_scale: f32,
    /// Halo opacity.
    pub halo_opacity: f32,
    /// Initial camera distance from the core.
    pub camera_distance: f32,
    /// Background clear color (RGB, 0.0-1.0).
    pub background_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            point_size: 0.7,
            halo_scale: 1.1,
            halo_opacity: 0.1,
            camera_distance: 40.0,
            background_color: [0.0, 0.0, 0.0],
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Initial values of the runtime tunables.
    pub tunables: Tunables,
    /// Force integrator constants.
    pub physics: PhysicsConfig,
    /// Spawn ring and cadence.
    pub spawn: SpawnConfig,
    /// Trail shaping and thresholds.
    pub trail: TrailConfig,
    /// Front end cosmetics.
    pub render: RenderConfig,
}

impl SimConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would break simulation invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tunables.validate()?;

        let p = &self.physics;
        positive("physics.max_speed", p.max_speed)?;
        positive("physics.distance_epsilon", p.distance_epsilon)?;
        non_negative("physics.gravity", p.gravity)?;
        non_negative("physics.tangential", p.tangential)?;
        unit("physics.depth_damping", p.depth_damping)?;

        let s = &self.spawn;
        if s.max_particles == 0 {
            return Err(invalid("spawn.max_particles", "must be at least 1"));
        }
        if s.interval_ms == 0 {
            return Err(invalid("spawn.interval_ms", "must be at least 1"));
        }
        if s.max_per_frame == 0 {
            return Err(invalid("spawn.max_per_frame", "must be at least 1"));
        }
        positive("spawn.spawn_radius", s.spawn_radius)?;
        non_negative("spawn.radius_jitter", s.radius_jitter)?;
        non_negative("spawn.z_spread", s.z_spread)?;
        if s.radius_jitter >= s.spawn_radius {
            return Err(invalid("spawn.radius_jitter", "must be smaller than spawn_radius"));
        }

        let t = &self.trail;
        positive("trail.core_radius", t.core_radius)?;
        non_negative("trail.spacing", t.spacing)?;
        unit("trail.lag_base", t.lag_base)?;
        non_negative("trail.lag_step", t.lag_step)?;
        non_negative("trail.absorb", t.absorb)?;
        non_negative("trail.redshift_strength", t.redshift_strength)?;
        positive("trail.redshift_radius", t.redshift_radius)?;
        unit("trail.baseline_opacity", t.baseline_opacity)?;
        unit("trail.vertex_alpha", t.vertex_alpha)?;
        if !(t.fade_end < t.fade_start) {
            return Err(invalid("trail.fade_end", "must be smaller than fade_start"));
        }
        if !(t.escape_distance > s.spawn_radius + s.radius_jitter) {
            return Err(invalid("trail.escape_distance", "must lie outside the spawn ring"));
        }

        positive("render.point_size", self.render.point_size)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite value > 0"))
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite value >= 0"))
    }
}

fn unit(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(invalid(field, "must be within [0, 1]"))
    }
}
