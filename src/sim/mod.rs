//! Deterministic particle simulation
//!
//! Everything physical lives here:
//! - Fixed tick phases, no wall-clock access
//! - Seeded RNG only
//! - Stable iteration order (by particle id, grid cells in coordinate order)
//! - No rendering or platform dependencies

pub mod boundary;
pub mod collision;
pub mod grid;
pub mod particle;
pub mod step;
pub mod store;
pub mod vector;

pub use boundary::{Boundary, Edge};
pub use collision::{
    BoundaryPolicy, EdgeContacts, particles_overlap, resolve_boundary, resolve_pair,
};
pub use grid::{CellCoord, PairScope, SpatialGrid};
pub use particle::{Particle, ParticleSpec};
pub use step::{ParticleView, RandomSpawn, Simulation, TickStats};
pub use store::ParticleStore;
pub use vector::VectorExt;
