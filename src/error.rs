//! Error types for event-horizon.
//!
//! The simulation core never fails at runtime: bad values are rejected at the
//! configuration boundary ([`TunableError`], [`ConfigError`]) and the GPU front
//! end reports its own setup failures ([`GpuError`], [`AppError`]).

use thiserror::Error;

/// A runtime tunable was given a value the simulation cannot use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TunableError {
    /// Trail length must be at least one vertex and below the hard cap.
    #[error("trail length must be between 1 and {max}, got {value}")]
    TrailLength {
        /// Rejected value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
    /// Pull strength must be finite and non-negative.
    #[error("pull strength must be a finite value >= 0, got {0}")]
    PullStrength(f32),
    /// Color channels must be finite and within [0, 1].
    #[error("{which} color must have finite channels in [0, 1], got {value:?}")]
    Color {
        /// Which end of the gradient was rejected.
        which: &'static str,
        /// Rejected RGB triple.
        value: [f32; 3],
    },
    /// Hex color string could not be parsed.
    #[error("invalid hex color {0:?}, expected #rrggbb")]
    HexColor(String),
}

/// Errors that can occur while loading, saving or validating a [`SimConfig`](crate::SimConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file was not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    /// One of the initial tunables is out of range.
    #[error("invalid tunables: {0}")]
    Tunable(#[from] TunableError),
    /// A tuning constant is out of range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field, e.g. `spawn.max_particles`.
        field: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a Vulkan/Metal/DX12/WebGPU capable device is required")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
}

/// Errors that can occur when running the windowed application.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration was rejected before the window opened.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
}
