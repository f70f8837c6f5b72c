//! Simulation tick
//!
//! One call to `step` runs Integrate -> UpdateIndex -> ResolveBoundaries ->
//! ResolvePairs to completion. Any phase that moves a particle re-syncs the
//! grid before the next phase reads it, so the index always matches the
//! store when control returns to the caller.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::boundary::Boundary;
use super::collision::{resolve_boundary, resolve_pair};
use super::grid::SpatialGrid;
use super::particle::{Particle, ParticleSpec};
use super::store::ParticleStore;
use super::vector::VectorExt;
use crate::consts::MAX_SUBSTEPS;
use crate::error::{PhysicsError, Result};
use crate::settings::SimConfig;

/// Counters from a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub particles: usize,
    /// Particles whose position changed during integration
    pub moved: usize,
    /// Edges corrected during boundary resolution
    pub boundary_contacts: usize,
    /// Pairs reported by the grid
    pub candidate_pairs: usize,
    /// Pairs that overlapped and were resolved
    pub resolved_pairs: usize,
    /// Overlapping pairs skipped because their centers coincide
    pub degenerate_pairs: usize,
}

/// What a renderer needs per particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleView {
    pub id: u32,
    pub position: Vec2,
    pub radius: f32,
}

/// Parameters for `Simulation::spawn_random`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomSpawn {
    pub min_radius: f32,
    pub max_radius: f32,
    /// Each velocity component is drawn from [-max_speed, max_speed]
    pub max_speed: f32,
    pub restitution: f32,
}

impl Default for RandomSpawn {
    fn default() -> Self {
        Self {
            min_radius: 2.0,
            max_radius: 5.0,
            max_speed: 50.0,
            restitution: crate::consts::DEFAULT_RESTITUTION,
        }
    }
}

/// Particle store, spatial index and the configuration driving them
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    store: ParticleStore,
    grid: SpatialGrid,
    tick_count: u64,
    /// (id, position the grid last saw) for particles moved in the current phase
    moved: Vec<(u32, Vec2)>,
}

impl Simulation {
    /// Validate `config` and build an empty simulation
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let grid = SpatialGrid::new(config.cell_size)?;
        log::debug!(
            "Simulation created: cell_size={}, boundary={:?}, policy={:?}, scope={:?}",
            config.cell_size,
            config.boundary,
            config.boundary_policy,
            config.pair_scope
        );
        Ok(Self {
            config,
            store: ParticleStore::new(),
            grid,
            tick_count: 0,
            moved: Vec::new(),
        })
    }

    /// Build a simulation and register every spec with the store and grid
    pub fn with_particles(
        config: SimConfig,
        specs: impl IntoIterator<Item = ParticleSpec>,
    ) -> Result<Self> {
        let mut sim = Self::new(config)?;
        for spec in specs {
            sim.spawn(spec)?;
        }
        Ok(sim)
    }

    /// Add a particle; returns its id
    pub fn spawn(&mut self, spec: ParticleSpec) -> Result<u32> {
        spec.validate()?;
        if !self.config.boundary.fits(spec.radius) {
            return Err(PhysicsError::config(format!(
                "radius {} does not fit inside a {}x{} boundary",
                spec.radius, self.config.boundary.width, self.config.boundary.height
            )));
        }
        let id = self.store.insert(spec)?;
        self.grid.insert(id, spec.position);
        log::debug!("Spawned particle {} at {:?}", id, spec.position);
        Ok(id)
    }

    /// Spawn `count` particles uniformly inside the boundary.
    ///
    /// Same seed, same particles. Overlap between spawned particles is allowed;
    /// the first ticks push them apart.
    pub fn spawn_random(
        &mut self,
        count: usize,
        seed: u64,
        params: RandomSpawn,
    ) -> Result<Vec<u32>> {
        let RandomSpawn {
            min_radius,
            max_radius,
            max_speed,
            restitution,
        } = params;
        if !min_radius.is_finite()
            || min_radius <= 0.0
            || !max_radius.is_finite()
            || max_radius < min_radius
        {
            return Err(PhysicsError::config(format!(
                "radius range must satisfy 0 < min <= max, got {min_radius}..={max_radius}"
            )));
        }
        if !max_speed.is_finite() || max_speed < 0.0 {
            return Err(PhysicsError::config(format!(
                "max_speed must be finite and >= 0, got {max_speed}"
            )));
        }
        if !self.config.boundary.fits(max_radius) {
            return Err(PhysicsError::config(format!(
                "max_radius {max_radius} does not fit inside the boundary"
            )));
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let lo = self.config.boundary.min();
        let hi = self.config.boundary.max();
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let radius = rng.random_range(min_radius..=max_radius);
            let position = Vec2::new(
                sample_inset(&mut rng, lo.x, hi.x, radius),
                sample_inset(&mut rng, lo.y, hi.y, radius),
            );
            let velocity = Vec2::new(
                rng.random_range(-max_speed..=max_speed),
                rng.random_range(-max_speed..=max_speed),
            );
            ids.push(self.spawn(ParticleSpec::new(position, velocity, radius, restitution))?);
        }
        log::info!("Spawned {} random particles (seed {})", count, seed);
        Ok(ids)
    }

    /// Remove a particle from the grid and the store.
    ///
    /// `Ok(None)` if no such particle exists.
    pub fn remove(&mut self, id: u32) -> Result<Option<Particle>> {
        let Some(position) = self.store.get(id).map(|p| p.position) else {
            return Ok(None);
        };
        self.grid.remove(id, position)?;
        Ok(self.store.remove(id))
    }

    /// Overwrite a particle's position and velocity from outside a tick
    pub fn set_motion(&mut self, id: u32, position: Vec2, velocity: Vec2) -> Result<()> {
        if !position.is_finite_vec() || !velocity.is_finite_vec() {
            return Err(PhysicsError::config("position and velocity must be finite"));
        }
        let particle = self
            .store
            .get_mut(id)
            .ok_or(PhysicsError::ParticleNotFound(id))?;
        let old = particle.position;
        self.grid.relocate(id, old, position)?;
        particle.position = position;
        particle.velocity = velocity;
        Ok(())
    }

    /// Advance by one tick of `dt` seconds
    pub fn step(&mut self, dt: f32) -> Result<TickStats> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        let mut stats = TickStats {
            particles: self.store.len(),
            ..Default::default()
        };

        // Integrate
        let acceleration = self.config.acceleration;
        self.moved.clear();
        for p in self.store.iter_mut() {
            let before = p.position;
            p.integrate(acceleration, dt);
            if p.position != before {
                self.moved.push((p.id, before));
            }
        }
        stats.moved = self.moved.len();

        // UpdateIndex
        self.sync_moved()?;

        // ResolveBoundaries
        let boundary = self.config.boundary;
        let policy = self.config.boundary_policy;
        for p in self.store.iter_mut() {
            let before = p.position;
            let contacts = resolve_boundary(p, &boundary, policy);
            stats.boundary_contacts += contacts.count();
            if p.position != before {
                self.moved.push((p.id, before));
            }
        }
        self.sync_moved()?;

        // ResolvePairs
        let margin = self.config.separation_margin;
        let store = &mut self.store;
        let mut displaced: BTreeMap<u32, Vec2> = BTreeMap::new();
        self.grid
            .for_each_candidate_pair(self.config.pair_scope, |a, b| {
                stats.candidate_pairs += 1;
                let Some((p1, p2)) = store.get_pair_mut(a, b) else {
                    return;
                };
                let (before1, before2) = (p1.position, p2.position);
                match resolve_pair(p1, p2, margin) {
                    Ok(true) => {
                        stats.resolved_pairs += 1;
                        displaced.entry(a).or_insert(before1);
                        displaced.entry(b).or_insert(before2);
                    }
                    Ok(false) => {}
                    Err(err) => {
                        stats.degenerate_pairs += 1;
                        log::trace!("Skipping pair ({}, {}): {}", a, b, err);
                    }
                }
            });
        self.moved.extend(displaced);
        self.sync_moved()?;

        self.tick_count += 1;
        log::trace!("Tick {}: {:?}", self.tick_count, stats);
        Ok(stats)
    }

    /// Advance by wall-clock `elapsed` seconds in equal substeps no longer than
    /// `max_substep`. Returns the number of substeps taken.
    pub fn advance(&mut self, elapsed: f32) -> Result<u32> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(PhysicsError::InvalidTimestep(elapsed));
        }
        let elapsed = elapsed.min(self.config.max_frame_time);
        if elapsed == 0.0 {
            return Ok(0);
        }
        let substeps = ((elapsed / self.config.max_substep).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let dt = elapsed / substeps as f32;
        for _ in 0..substeps {
            self.step(dt)?;
        }
        Ok(substeps)
    }

    /// Relocate every particle in `moved` from its recorded position to its current one
    fn sync_moved(&mut self) -> Result<()> {
        for &(id, before) in &self.moved {
            if let Some(p) = self.store.get(id) {
                self.grid.relocate(id, before, p.position)?;
            }
        }
        self.moved.clear();
        Ok(())
    }

    /// Verify each particle sits in exactly the cell its position maps to
    pub fn check_grid_consistency(&self) -> Result<()> {
        for (cell, id) in self.grid.iter() {
            match self.store.get(id) {
                Some(p) if self.grid.cell_of(p.position) == cell => {}
                _ => return Err(PhysicsError::UnknownId { id, cell }),
            }
        }
        for p in self.store.iter() {
            let cell = self.grid.cell_of(p.position);
            if !self.grid.members(cell).is_some_and(|m| m.contains(&p.id)) {
                return Err(PhysicsError::UnknownId { id: p.id, cell });
            }
        }
        Ok(())
    }

    /// Position and radius of every particle, in id order
    pub fn snapshot(&self) -> Vec<ParticleView> {
        self.store
            .iter()
            .map(|p| ParticleView {
                id: p.id,
                position: p.position,
                radius: p.radius(),
            })
            .collect()
    }

    /// Total kinetic energy with unit masses
    pub fn kinetic_energy(&self) -> f32 {
        self.store.iter().map(Particle::kinetic_energy).sum()
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    pub fn particle(&self, id: u32) -> Option<&Particle> {
        self.store.get(id)
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn boundary(&self) -> &Boundary {
        &self.config.boundary
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Uniform in `[min + radius, max - radius]`, or the midpoint when rounding
/// leaves that range empty for a particle that exactly fits
fn sample_inset(rng: &mut Pcg32, min: f32, max: f32, radius: f32) -> f32 {
    let (lo, hi) = (min + radius, max - radius);
    if lo <= hi {
        rng.random_range(lo..=hi)
    } else {
        (min + max) * 0.5
    }
}
