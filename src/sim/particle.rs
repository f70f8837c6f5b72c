//! Particle entity
//!
//! Position and velocity change every tick. Radius and restitution are fixed
//! at creation and only exposed through getters.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vector::VectorExt;
use crate::error::{PhysicsError, Result};

/// Creation parameters for a particle (id is assigned by the store)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpec {
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    pub radius: f32,
    /// Coefficient of restitution in [0, 1]
    #[serde(default = "default_restitution")]
    pub restitution: f32,
}

fn default_restitution() -> f32 {
    crate::consts::DEFAULT_RESTITUTION
}

impl ParticleSpec {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, restitution: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            restitution,
        }
    }

    /// Check the creation invariants without allocating an id
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(PhysicsError::config(format!(
                "radius must be finite and > 0, got {}",
                self.radius
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::config(format!(
                "restitution must be in [0, 1], got {}",
                self.restitution
            )));
        }
        if !self.position.is_finite_vec() {
            return Err(PhysicsError::config("position must be finite"));
        }
        if !self.velocity.is_finite_vec() {
            return Err(PhysicsError::config("velocity must be finite"));
        }
        Ok(())
    }
}

/// A simulated disc
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    radius: f32,
    restitution: f32,
}

impl Particle {
    /// Build a particle after validating `spec`
    pub fn new(id: u32, spec: ParticleSpec) -> Result<Self> {
        spec.validate()?;
        Ok(Self {
            id,
            position: spec.position,
            velocity: spec.velocity,
            radius: spec.radius,
            restitution: spec.restitution,
        })
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Semi-implicit Euler: position moves with the velocity from before
    /// this tick's acceleration is applied.
    #[inline]
    pub fn integrate(&mut self, acceleration: Vec2, dt: f32) {
        self.position += self.velocity * dt;
        self.velocity += acceleration * dt;
    }

    /// Kinetic energy with unit mass
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.velocity.length_squared()
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite_vec() && self.velocity.is_finite_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ParticleSpec {
        ParticleSpec::new(Vec2::new(150.0, 150.0), Vec2::new(10.0, 10.0), 10.0, 0.8)
    }

    #[test]
    fn test_new_keeps_fields() {
        let p = Particle::new(3, spec()).unwrap();
        assert_eq!(p.id, 3);
        assert_eq!(p.radius(), 10.0);
        assert_eq!(p.restitution(), 0.8);
        assert_eq!(p.position, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn test_rejects_bad_radius() {
        for r in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let s = ParticleSpec { radius: r, ..spec() };
            assert!(matches!(
                Particle::new(1, s),
                Err(PhysicsError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_rejects_bad_restitution() {
        for e in [-0.1, 1.5, f32::NAN] {
            let s = ParticleSpec { restitution: e, ..spec() };
            assert!(Particle::new(1, s).is_err());
        }
    }

    #[test]
    fn test_rejects_non_finite_motion() {
        let s = ParticleSpec {
            velocity: Vec2::new(f32::NAN, 0.0),
            ..spec()
        };
        assert!(Particle::new(1, s).is_err());
    }

    #[test]
    fn test_integrate_uses_pre_update_velocity() {
        let mut p = Particle::new(1, spec()).unwrap();
        p.integrate(Vec2::new(0.0, 9.8), 1.0);
        assert_eq!(p.position, Vec2::new(160.0, 160.0));
        assert!((p.velocity.y - 19.8).abs() < 1e-5);
        assert_eq!(p.velocity.x, 10.0);
    }

    #[test]
    fn test_spec_deserializes_with_defaults() {
        let s: ParticleSpec =
            serde_json::from_str(r#"{"position":[1.0,2.0],"radius":3.0}"#).unwrap();
        assert_eq!(s.velocity, Vec2::ZERO);
        assert_eq!(s.restitution, crate::consts::DEFAULT_RESTITUTION);
    }
}
