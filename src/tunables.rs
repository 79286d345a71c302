//! Runtime-adjustable parameters shared by every particle.
//!
//! [`Tunables`] is a plain value passed by reference into the pool and the
//! integrator. Changes go through [`TunableUpdate`] so each one is validated
//! before it can reach the physics, and so the scene can react to changes
//! that invalidate live particles (see [`Scene::update_tunable`](crate::Scene::update_tunable)).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::TunableError;

/// Largest accepted trail length.
pub const MAX_TRAIL_LENGTH: u32 = 500;

/// Process-wide simulation settings adjustable while running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Number of trail vertices per particle.
    pub trail_length: u32,
    /// Multiplier on gravity and tangential force.
    pub pull_strength: f32,
    /// Color of the newest trail vertex (RGB, 0.0-1.0).
    #[serde(with = "color_serde")]
    pub head_color: Vec3,
    /// Color of the oldest trail vertex (RGB, 0.0-1.0).
    #[serde(with = "color_serde")]
    pub tail_color: Vec3,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            trail_length: 20,
            pull_strength: 1.0,
            head_color: Vec3::ONE,
            tail_color: Vec3::ONE,
        }
    }
}

impl Tunables {
    /// Check every field against the same rules [`TunableUpdate`] enforces.
    pub fn validate(&self) -> Result<(), TunableError> {
        TunableUpdate::TrailLength(self.trail_length).validate()?;
        TunableUpdate::PullStrength(self.pull_strength).validate()?;
        TunableUpdate::HeadColor(self.head_color).validate()?;
        TunableUpdate::TailColor(self.tail_color).validate()?;
        Ok(())
    }

    /// Apply a validated update.
    ///
    /// Returns `true` when the value actually changed. Rejected updates leave
    /// `self` untouched.
    pub fn apply(&mut self, update: TunableUpdate) -> Result<bool, TunableError> {
        update.validate()?;
        let changed = match update {
            TunableUpdate::TrailLength(n) => replace(&mut self.trail_length, n),
            TunableUpdate::PullStrength(s) => replace(&mut self.pull_strength, s),
            TunableUpdate::HeadColor(c) => replace(&mut self.head_color, c),
            TunableUpdate::TailColor(c) => replace(&mut self.tail_color, c),
        };
        Ok(changed)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// A single change to one tunable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TunableUpdate {
    /// New trail length. Destroys every live particle when it differs.
    TrailLength(u32),
    /// New pull strength. Takes effect on the next tick.
    PullStrength(f32),
    /// New head color. Takes effect on the next color computation.
    HeadColor(Vec3),
    /// New tail color. Takes effect on the next color computation.
    TailColor(Vec3),
}

impl TunableUpdate {
    /// Reject values that would corrupt the simulation.
    pub fn validate(&self) -> Result<(), TunableError> {
        match *self {
            TunableUpdate::TrailLength(n) => {
                if n == 0 || n > MAX_TRAIL_LENGTH {
                    return Err(TunableError::TrailLength {
                        value: n,
                        max: MAX_TRAIL_LENGTH,
                    });
                }
            }
            TunableUpdate::PullStrength(s) => {
                if !s.is_finite() || s < 0.0 {
                    return Err(TunableError::PullStrength(s));
                }
            }
            TunableUpdate::HeadColor(c) => validate_color("head", c)?,
            TunableUpdate::TailColor(c) => validate_color("tail", c)?,
        }
        Ok(())
    }

    /// Whether applying this update invalidates existing trail buffers.
    pub fn requires_restart(&self) -> bool {
        matches!(self, TunableUpdate::TrailLength(_))
    }
}

fn validate_color(which: &'static str, c: Vec3) -> Result<(), TunableError> {
    let in_range = c.is_finite() && c.cmpge(Vec3::ZERO).all() && c.cmple(Vec3::ONE).all();
    if in_range {
        Ok(())
    } else {
        Err(TunableError::Color {
            which,
            value: c.to_array(),
        })
    }
}

/// Parse a `#rrggbb` (or `rrggbb`) string into an RGB color in [0, 1].
pub fn parse_hex_color(s: &str) -> Result<Vec3, TunableError> {
    let digits = s.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TunableError::HexColor(s.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| TunableError::HexColor(s.to_string()))
    };
    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format an RGB color in [0, 1] as `#rrggbb`.
pub fn to_hex_color(c: Vec3) -> String {
    let [r, g, b] = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round().to_array();
    format!("#{:02x}{:02x}{:02x}", r as u8, g as u8, b as u8)
}

/// Colors are written as `#rrggbb` and read from either a hex string or an
/// `[r, g, b]` array.
mod color_serde {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Hex(String),
        Rgb([f32; 3]),
    }

    pub fn serialize<S: Serializer>(color: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex_color(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => super::parse_hex_color(&s).map_err(serde::de::Error::custom),
            Repr::Rgb(rgb) => Ok(Vec3::from(rgb)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tunables::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_trail_length() {
        let mut t = Tunables::default();
        let err = t.apply(TunableUpdate::TrailLength(0)).unwrap_err();
        assert!(matches!(err, TunableError::TrailLength { value: 0, .. }));
        assert_eq!(t.trail_length, 20);
    }

    #[test]
    fn test_rejects_oversized_trail_length() {
        assert!(TunableUpdate::TrailLength(MAX_TRAIL_LENGTH + 1).validate().is_err());
        assert!(TunableUpdate::TrailLength(MAX_TRAIL_LENGTH).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_pull_strength() {
        assert!(TunableUpdate::PullStrength(-0.1).validate().is_err());
        assert!(TunableUpdate::PullStrength(f32::NAN).validate().is_err());
        assert!(TunableUpdate::PullStrength(f32::INFINITY).validate().is_err());
        assert!(TunableUpdate::PullStrength(0.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_color() {
        let err = TunableUpdate::HeadColor(Vec3::new(1.5, 0.0, 0.0))
            .validate()
            .unwrap_err();
        assert!(matches!(err, TunableError::Color { which: "head", .. }));
        assert!(TunableUpdate::TailColor(Vec3::new(0.0, f32::NAN, 0.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_apply_reports_change() {
        let mut t = Tunables::default();
        assert!(!t.apply(TunableUpdate::PullStrength(1.0)).unwrap());
        assert!(t.apply(TunableUpdate::PullStrength(2.5)).unwrap());
        assert_eq!(t.pull_strength, 2.5);
    }

    #[test]
    fn test_only_trail_length_requires_restart() {
        assert!(TunableUpdate::TrailLength(5).requires_restart());
        assert!(!TunableUpdate::PullStrength(0.5).requires_restart());
        assert!(!TunableUpdate::HeadColor(Vec3::ZERO).requires_restart());
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(parse_hex_color("#ffffff").unwrap(), Vec3::ONE);
        assert_eq!(parse_hex_color("000000").unwrap(), Vec3::ZERO);
        let orange = parse_hex_color("#ff8000").unwrap();
        assert!((orange.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(to_hex_color(orange), "#ff8000");
        assert!(parse_hex_color("#fff").is_err());
        assert!(parse_hex_color("#gggggg").is_err());
        assert!(parse_hex_color("#+f+f+f").is_err());
    }

    #[test]
    fn test_colors_serialize_as_hex() {
        let t = Tunables {
            tail_color: Vec3::new(1.0, 0.0, 0.0),
            ..Tunables::default()
        };
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains(r##""tail_color":"#ff0000""##));
        let back: Tunables = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_colors_accept_arrays() {
        let t: Tunables = serde_json::from_str(r#"{ "head_color": [0.0, 0.5, 1.0] }"#).unwrap();
        assert_eq!(t.head_color, Vec3::new(0.0, 0.5, 1.0));
        assert!(serde_json::from_str::<Tunables>(r##"{ "head_color": "#12" }"##).is_err());
    }
}
