//! Grid Physics - 2D particle collisions on a uniform grid
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, spatial grid, collision response)
//! - `settings`: JSON configuration
//! - `error`: Error type shared by every module

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{PhysicsError, Result};
pub use settings::SimConfig;
pub use sim::{ParticleSpec, Simulation};

/// Simulation constants
pub mod consts {
    /// Default fixed step (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 16;
    /// Longest frame `advance` will simulate
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Reference container
    pub const BOUNDARY_ORIGIN: (f32, f32) = (100.0, 100.0);
    pub const BOUNDARY_WIDTH: f32 = 200.0;
    pub const BOUNDARY_HEIGHT: f32 = 100.0;

    /// Downward in screen coordinates (y grows down)
    pub const GRAVITY: (f32, f32) = (0.0, 9.8);

    /// Fits a radius-10 particle
    pub const DEFAULT_CELL_SIZE: f32 = 20.0;
    /// Largest cell index the boundary may span; leaves headroom below `i32::MAX`
    pub const MAX_CELL_INDEX: f32 = (1 << 30) as f32;
    /// Gap added on each side when pushing an overlapping pair apart
    pub const SEPARATION_MARGIN: f32 = 0.5;
    pub const DEFAULT_RESTITUTION: f32 = 0.8;
}
