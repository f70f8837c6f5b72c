//! Axis-aligned rectangular container
//!
//! Screen orientation: the "top" edge is at `origin.y`, the "bottom" edge at
//! `origin.y + height`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vector::VectorExt;
use crate::error::{PhysicsError, Result};

/// One of the four container edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Default for Boundary {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            origin: Vec2::new(BOUNDARY_ORIGIN.0, BOUNDARY_ORIGIN.1),
            width: BOUNDARY_WIDTH,
            height: BOUNDARY_HEIGHT,
        }
    }
}

impl Boundary {
    pub fn new(origin: Vec2, width: f32, height: f32) -> Result<Self> {
        let boundary = Self {
            origin,
            width,
            height,
        };
        boundary.validate()?;
        Ok(boundary)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.origin.is_finite_vec() {
            return Err(PhysicsError::config("boundary origin must be finite"));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(PhysicsError::config(format!(
                "boundary width must be finite and > 0, got {}",
                self.width
            )));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(PhysicsError::config(format!(
                "boundary height must be finite and > 0, got {}",
                self.height
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.origin + Vec2::new(self.width, self.height)
    }

    /// Whether a disc of `radius` fits between opposite edges at all
    pub fn fits(&self, radius: f32) -> bool {
        2.0 * radius <= self.width && 2.0 * radius <= self.height
    }

    /// Whether a disc at `position` lies fully inside (touching counts)
    pub fn contains(&self, position: Vec2, radius: f32) -> bool {
        let lo = self.min() + Vec2::splat(radius);
        let hi = self.max() - Vec2::splat(radius);
        position.x >= lo.x && position.x <= hi.x && position.y >= lo.y && position.y <= hi.y
    }
}
