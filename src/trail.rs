//! Trail geometry and coloring.
//!
//! A trail is not a history of past positions. Each tick the head snaps to
//! the particle and every other vertex eases toward a point a fixed spacing
//! behind it along the current heading. The lag grows with the vertex index,
//! which gives the flowing look at a fraction of the cost of a real history.
//!
//! Buffers are boxed slices: their length is fixed when the particle is
//! created and cannot change afterwards.

use glam::{Vec3, Vec4};

use crate::config::TrailConfig;
use crate::tunables::Tunables;

/// Why a particle should leave the pool after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fate {
    /// Fell inside the absorption threshold.
    Absorbed,
    /// Travelled beyond the escape distance.
    Escaped,
    /// Position, velocity or trail became NaN or infinite.
    Corrupted,
}

/// Per-particle trail vertex buffers.
#[derive(Debug, Clone)]
pub struct TrailState {
    positions: Box<[Vec3]>,
    colors: Box<[Vec4]>,
}

impl TrailState {
    /// Create a trail of `len` vertices collapsed onto `start`.
    pub fn new(len: usize, start: Vec3, head_color: Vec3, alpha: f32) -> Self {
        Self {
            positions: vec![start; len].into_boxed_slice(),
            colors: vec![head_color.extend(alpha); len].into_boxed_slice(),
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the trail has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Vertex positions, head first.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex colors (RGBA), head first.
    #[inline]
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Recompute positions and colors from the particle's new state.
    pub fn update(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        distance: f32,
        tunables: &Tunables,
        config: &TrailConfig,
    ) {
        let len = self.len();
        let heading = velocity.normalize_or_zero();

        for i in 0..len {
            if i == 0 {
                self.positions[0] = position;
            } else {
                let behind = position - heading * (i as f32 * config.spacing);
                let lag = (config.lag_base + i as f32 * config.lag_step).min(1.0);
                self.positions[i] = self.positions[i].lerp(behind, lag);
            }

            let t = gradient_t(i, len);
            self.colors[i] = trail_color(t, distance, tunables, config).extend(config.vertex_alpha);
        }
    }

    /// Whether every stored vertex is finite.
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|p| p.is_finite()) && self.colors.iter().all(|c| c.is_finite())
    }
}

/// Gradient parameter for vertex `i` of `len`: 0 at the head, 1 at the tail.
#[inline]
pub fn gradient_t(i: usize, len: usize) -> f32 {
    if len <= 1 {
        0.0
    } else {
        i as f32 / (len - 1) as f32
    }
}

/// Redshift amount at `distance`: 0 at or beyond the redshift radius, 1 at the core.
#[inline]
pub fn redshift_factor(distance: f32, config: &TrailConfig) -> f32 {
    1.0 - (distance / config.redshift_radius).clamp(0.0, 1.0)
}

/// Trail color at gradient position `t` for a particle `distance` from the core.
///
/// Head and tail colors are blended linearly, then red is boosted and green
/// and blue suppressed in proportion to [`redshift_factor`]. Channels are
/// clamped to `[0, 1]`.
pub fn trail_color(t: f32, distance: f32, tunables: &Tunables, config: &TrailConfig) -> Vec3 {
    let base = tunables.head_color.lerp(tunables.tail_color, t);
    let shift = redshift_factor(distance, config) * config.redshift_strength;
    let shifted = base * Vec3::new(1.0 + shift, 1.0 - shift, 1.0 - shift);
    shifted.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Drawable opacity for a particle `distance` from the core.
///
/// Inside the fade-start radius the opacity ramps linearly from 0 at the
/// fade-end radius; elsewhere it is the baseline.
pub fn opacity(distance: f32, config: &TrailConfig) -> f32 {
    let start = config.fade_start_distance();
    let end = config.fade_end_distance();
    if distance < start {
        ((distance - end) / (start - end)).clamp(0.0, 1.0)
    } else {
        config.baseline_opacity.clamp(0.0, 1.0)
    }
}

/// Removal verdict for a particle `distance` from the core, if any.
pub fn fate(distance: f32, config: &TrailConfig) -> Option<Fate> {
    if !distance.is_finite() {
        Some(Fate::Corrupted)
    } else if distance < config.absorb_distance() {
        Some(Fate::Absorbed)
    } else if distance > config.escape_distance {
        Some(Fate::Escaped)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_tunables() -> Tunables {
        Tunables {
            head_color: Vec3::ONE,
            tail_color: Vec3::ZERO,
            ..Tunables::default()
        }
    }

    #[test]
    fn test_new_trail_is_collapsed() {
        let trail = TrailState::new(4, Vec3::X, Vec3::ONE, 0.8);
        assert_eq!(trail.len(), 4);
        assert!(trail.positions().iter().all(|&p| p == Vec3::X));
        assert!(trail.colors().iter().all(|&c| c == Vec4::new(1.0, 1.0, 1.0, 0.8)));
    }

    #[test]
    fn test_head_snaps_to_position() {
        let config = TrailConfig::default();
        let mut trail = TrailState::new(5, Vec3::ZERO, Vec3::ONE, 0.8);
        let p = Vec3::new(10.0, 2.0, 0.0);
        trail.update(p, Vec3::X * 0.1, p.length(), &Tunables::default(), &config);
        assert_eq!(trail.positions()[0], p);
    }

    #[test]
    fn test_vertices_ease_toward_targets() {
        let config = TrailConfig::default();
        let start = Vec3::new(20.0, 0.0, 0.0);
        let mut trail = TrailState::new(3, start, Vec3::ONE, 0.8);
        let p = Vec3::new(21.0, 0.0, 0.0);
        trail.update(p, Vec3::X * 0.1, p.length(), &Tunables::default(), &config);

        // vertex 1: target 20.95, lag 0.21
        let expected = 20.0 + (20.95 - 20.0) * 0.21;
        assert!((trail.positions()[1].x - expected).abs() < 1e-4);
        // Later vertices lag behind earlier ones.
        assert!(trail.positions()[2].x < trail.positions()[0].x);
    }

    #[test]
    fn test_zero_velocity_collapses_targets_on_head() {
        let config = TrailConfig::default();
        let mut trail = TrailState::new(3, Vec3::ZERO, Vec3::ONE, 0.8);
        let p = Vec3::new(10.0, 0.0, 0.0);
        trail.update(p, Vec3::ZERO, p.length(), &Tunables::default(), &config);
        assert!(trail.is_finite());
        assert!(trail.positions()[1].x > 0.0 && trail.positions()[1].x < 10.0);
    }

    #[test]
    fn test_lag_never_overshoots() {
        let config = TrailConfig::default();
        let mut trail = TrailState::new(200, Vec3::ZERO, Vec3::ONE, 0.8);
        let p = Vec3::new(40.0, 0.0, 0.0);
        trail.update(p, Vec3::X * 0.1, p.length(), &Tunables::default(), &config);
        // Vertex 199 has lag clamped to 1 and lands exactly on its target.
        let target = 40.0 - 199.0 * config.spacing;
        assert!((trail.positions()[199].x - target).abs() < 1e-3);
    }

    #[test]
    fn test_gradient_t() {
        assert_eq!(gradient_t(0, 1), 0.0);
        assert_eq!(gradient_t(0, 5), 0.0);
        assert_eq!(gradient_t(2, 5), 0.5);
        assert_eq!(gradient_t(4, 5), 1.0);
    }

    #[test]
    fn test_midpoint_gray_without_redshift() {
        let config = TrailConfig::default();
        let tunables = gray_tunables();
        let c = trail_color(0.5, config.redshift_radius, &tunables, &config);
        assert_eq!(c, Vec3::splat(0.5));
    }

    #[test]
    fn test_redshift_grows_toward_core() {
        let config = TrailConfig::default();
        let tunables = gray_tunables();
        let far = trail_color(0.5, 20.0, &tunables, &config);
        let near = trail_color(0.5, 8.0, &tunables, &config);
        assert!(far.x > far.y);
        assert!(near.x > far.x);
        assert!(near.y < far.y);
        assert!(near.z < far.z);
    }

    #[test]
    fn test_colors_are_clamped() {
        let config = TrailConfig::default();
        let tunables = Tunables {
            head_color: Vec3::ONE,
            tail_color: Vec3::ONE,
            ..Tunables::default()
        };
        let c = trail_color(0.0, 0.0, &tunables, &config);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_update_writes_gradient() {
        let config = TrailConfig::default();
        let mut trail = TrailState::new(3, Vec3::ZERO, Vec3::ONE, 0.8);
        let p = Vec3::new(50.0, 0.0, 0.0);
        trail.update(p, Vec3::Y * 0.1, p.length(), &gray_tunables(), &config);
        assert_eq!(trail.colors()[0], Vec4::new(1.0, 1.0, 1.0, 0.8));
        assert_eq!(trail.colors()[1], Vec4::new(0.5, 0.5, 0.5, 0.8));
        assert_eq!(trail.colors()[2], Vec4::new(0.0, 0.0, 0.0, 0.8));
    }

    #[test]
    fn test_opacity_ramp() {
        let config = TrailConfig::default();
        assert_eq!(opacity(20.0, &config), 0.8);
        assert_eq!(opacity(3.0, &config), 0.0);
        assert!((opacity(4.25, &config) - 0.5).abs() < 1e-4);
        assert!(opacity(4.99, &config) <= 1.0);
    }

    #[test]
    fn test_fate_thresholds() {
        let config = TrailConfig::default();
        assert_eq!(fate(2.0, &config), Some(Fate::Absorbed));
        assert_eq!(fate(80.0, &config), Some(Fate::Escaped));
        assert_eq!(fate(f32::NAN, &config), Some(Fate::Corrupted));
        assert_eq!(fate(30.0, &config), None);
    }
}
