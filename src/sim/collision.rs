//! Collision response for discs
//!
//! Two solvers: reflecting a particle off the container edges, and the
//! pairwise restitution exchange along the contact normal with positional
//! push-out so a pair does not keep re-triggering.

use serde::{Deserialize, Serialize};

use super::boundary::{Boundary, Edge};
use super::particle::Particle;
use super::vector::VectorExt;
use crate::error::Result;

/// How many edges a single boundary check may correct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Test left, right, top, bottom in order and correct only the first hit.
    /// A particle deep in a corner takes more than one tick to settle.
    #[default]
    FirstViolation,
    /// Correct the x and y axes independently on every call
    AllAxes,
}

/// Edges corrected by one `resolve_boundary` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeContacts {
    pub x: Option<Edge>,
    pub y: Option<Edge>,
}

impl EdgeContacts {
    pub fn hit(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    pub fn count(&self) -> usize {
        self.x.is_some() as usize + self.y.is_some() as usize
    }
}

/// Reflect and clamp a particle that crosses a container edge
pub fn resolve_boundary(
    particle: &mut Particle,
    boundary: &Boundary,
    policy: BoundaryPolicy,
) -> EdgeContacts {
    let e = particle.restitution();
    let r = particle.radius();
    let min = boundary.min();
    let max = boundary.max();

    let x_edge = if particle.position.x - r < min.x {
        Some((Edge::Left, min.x + r))
    } else if particle.position.x + r > max.x {
        Some((Edge::Right, max.x - r))
    } else {
        None
    };

    let mut contacts = EdgeContacts::default();
    if let Some((edge, clamp)) = x_edge {
        particle.velocity.x = -e * particle.velocity.x;
        particle.position.x = clamp;
        contacts.x = Some(edge);
        if policy == BoundaryPolicy::FirstViolation {
            return contacts;
        }
    }

    let y_edge = if particle.position.y - r < min.y {
        Some((Edge::Top, min.y + r))
    } else if particle.position.y + r > max.y {
        Some((Edge::Bottom, max.y - r))
    } else {
        None
    };

    if let Some((edge, clamp)) = y_edge {
        particle.velocity.y = -e * particle.velocity.y;
        particle.position.y = clamp;
        contacts.y = Some(edge);
    }

    contacts
}

/// Squared-distance overlap test (no square root on the hot path)
#[inline]
pub fn particles_overlap(a: &Particle, b: &Particle) -> bool {
    let reach = a.radius() + b.radius();
    a.position.distance_squared(b.position) < reach * reach
}

/// Resolve contact between two overlapping particles.
///
/// Returns `Ok(false)` if they do not overlap. Coincident centers give
/// `DegenerateVector` and leave both particles untouched.
///
/// The restitution of `p1` is used for the whole pair.
pub fn resolve_pair(p1: &mut Particle, p2: &mut Particle, separation_margin: f32) -> Result<bool> {
    if !particles_overlap(p1, p2) {
        return Ok(false);
    }

    let normal = (p2.position - p1.position).unit()?;
    let tangent = normal.rotate_90();

    let v1n = p1.velocity.dot(normal);
    let v2n = p2.velocity.dot(normal);
    let v1t = p1.velocity.dot(tangent);
    let v2t = p2.velocity.dot(tangent);

    let e = p1.restitution();
    let v1n_new = ((1.0 + e) * v2n + (1.0 - e) * v1n) / 2.0;
    let v2n_new = ((1.0 - e) * v2n + (1.0 + e) * v1n) / 2.0;

    p1.velocity = normal * v1n_new + tangent * v1t;
    p2.velocity = normal * v2n_new + tangent * v2t;

    // Push both out from the midpoint along the contact normal
    let mid = (p1.position + p2.position) * 0.5;
    p1.position = mid - normal * (p1.radius() + separation_margin);
    p2.position = mid + normal * (p2.radius() + separation_margin);

    Ok(true)
}
