//! Simulation configuration
//!
//! Loaded from JSON; every field falls back to the reference setup when
//! missing. Validated once, when a simulation is built from it.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{PhysicsError, Result};
use crate::sim::{Boundary, BoundaryPolicy, PairScope};

/// Simulation parameters fixed for the lifetime of a `Simulation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Spatial grid cell edge; should be at least the largest particle diameter
    pub cell_size: f32,
    /// Constant acceleration applied every tick (gravity)
    pub acceleration: Vec2,
    /// The container
    pub boundary: Boundary,
    /// Extra gap added on each side when pushing an overlapping pair apart
    pub separation_margin: f32,
    pub boundary_policy: BoundaryPolicy,
    pub pair_scope: PairScope,

    // === Frame driving ===
    /// Longest single step `advance` will take
    pub max_substep: f32,
    /// Elapsed time above this is dropped by `advance` (spiral of death guard)
    pub max_frame_time: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            acceleration: Vec2::new(GRAVITY.0, GRAVITY.1),
            boundary: Boundary::default(),
            separation_margin: SEPARATION_MARGIN,
            boundary_policy: BoundaryPolicy::default(),
            pair_scope: PairScope::default(),
            max_substep: SIM_DT,
            max_frame_time: MAX_FRAME_TIME,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(PhysicsError::config(format!(
                "cell_size must be finite and > 0, got {}",
                self.cell_size
            )));
        }
        if !(self.acceleration.x.is_finite() && self.acceleration.y.is_finite()) {
            return Err(PhysicsError::config("acceleration must be finite"));
        }
        self.boundary.validate()?;
        let span = self.boundary.min().abs().max(self.boundary.max().abs()).max_element();
        if span / self.cell_size >= MAX_CELL_INDEX {
            return Err(PhysicsError::config(format!(
                "cell_size {} is too small for a boundary reaching {span}",
                self.cell_size
            )));
        }
        if !self.separation_margin.is_finite() || self.separation_margin < 0.0 {
            return Err(PhysicsError::config(format!(
                "separation_margin must be finite and >= 0, got {}",
                self.separation_margin
            )));
        }
        if !self.max_substep.is_finite() || self.max_substep <= 0.0 {
            return Err(PhysicsError::config(format!(
                "max_substep must be finite and > 0, got {}",
                self.max_substep
            )));
        }
        if !self.max_frame_time.is_finite() || self.max_frame_time <= 0.0 {
            return Err(PhysicsError::config(format!(
                "max_frame_time must be finite and > 0, got {}",
                self.max_frame_time
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
