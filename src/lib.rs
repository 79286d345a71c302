//! # Event Horizon
//!
//! Light rays spiralling into a black hole, as a stylized particle trail
//! visualization.
//!
//! Each ray spawns on a ring around the core, is pulled inward by a
//! simplified gravity model with a tangential swirl, and drags a fading trail
//! of its recent positions behind it. Rays that reach the core are absorbed,
//! rays that drift too far escape, and the population is capped so the oldest
//! ray makes room for each new one.
//!
//! ## Quick Start
//!
//! ```ignore
//! use event_horizon::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     event_horizon::run(SimConfig::default())
//! }
//! ```
//!
//! ## Headless use
//!
//! The simulation only talks to rendering through [`RenderBackend`]. The
//! in-process [`DrawableStore`] implements it without a GPU, which is what
//! the tests and the `--headless` mode use:
//!
//! ```
//! use std::time::Duration;
//! use event_horizon::{DrawableStore, Scene, SimConfig, TunableUpdate};
//!
//! let mut scene = Scene::with_seed(SimConfig::default(), DrawableStore::new(), 7).unwrap();
//! scene.frame(Duration::from_millis(50));
//! assert_eq!(scene.pool().len(), 5);
//!
//! // trail length changes restart every ray
//! scene.update_tunable(TunableUpdate::TrailLength(40)).unwrap();
//! assert!(scene.pool().is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! ### Tunables
//!
//! [`Tunables`] holds the four values a user can change while the scene
//! runs: trail length, pull strength, and the head and tail colors of the
//! trail gradient. They only change through [`Scene::update_tunable`], which
//! validates each [`TunableUpdate`] first.
//!
//! ### Configuration
//!
//! Everything else (force constants, the spawn ring, fade distances, point
//! size, camera) lives in [`SimConfig`], loadable from JSON.
//!
//! ### Frame loop
//!
//! [`Scene::frame`] runs every spawn that came due on the fixed spawn clock,
//! then one tick: integrate, update trails, evict absorbed or escaped rays.
//!
//! ## Controls
//!
//! See [`controls`] for the keyboard bindings. Building with the `egui`
//! feature adds a control panel with sliders and color pickers.

pub mod backend;
pub mod config;
pub mod controls;
pub mod error;
pub mod integrator;
mod particle;
pub mod pool;
pub mod scene;
pub mod spawn;
pub mod time;
pub mod trail;
pub mod tunables;

mod app;
mod gpu;

pub use app::{run, run_headless, HEADLESS_FRAME};
pub use backend::{Drawable, DrawableHandle, DrawableStore, RenderBackend};
pub use config::{PhysicsConfig, RenderConfig, SimConfig, SpawnConfig, TrailConfig};
pub use error::{AppError, ConfigError, GpuError, TunableError};
pub use glam::{Vec3, Vec4};
pub use particle::Particle;
pub use pool::{EvictReason, ParticlePool, PoolStats, TickReport};
pub use scene::{FrameReport, Scene};
pub use time::{SpawnClock, Time};
pub use trail::{Fate, TrailState};
pub use tunables::{parse_hex_color, to_hex_color, TunableUpdate, Tunables, MAX_TRAIL_LENGTH};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use event_horizon::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{DrawableStore, RenderBackend};
    pub use crate::config::SimConfig;
    pub use crate::error::{AppError, ConfigError, TunableError};
    pub use crate::scene::Scene;
    pub use crate::tunables::{TunableUpdate, Tunables};
    pub use glam::{Vec3, Vec4};
}
