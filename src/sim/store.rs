//! Particle store
//!
//! Sole owner of particle data. Particles are kept sorted by id so iteration
//! order is stable, and ids come from an allocator owned by the store.

use std::collections::HashMap;

use super::particle::{Particle, ParticleSpec};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ParticleStore {
    /// Sorted by id
    particles: Vec<Particle>,
    /// id -> index into `particles`
    index: HashMap<u32, usize>,
    /// Next id to hand out; ids are never reused
    next_id: u32,
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleStore {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate an id and store a particle built from `spec`
    pub fn insert(&mut self, spec: ParticleSpec) -> Result<u32> {
        let id = self.next_id;
        // An invalid spec does not burn the id
        let particle = Particle::new(id, spec)?;
        self.next_id += 1;
        // Monotonic ids keep the vec sorted on push
        self.index.insert(id, self.particles.len());
        self.particles.push(particle);
        Ok(id)
    }

    /// Remove a particle, preserving id order of the rest
    pub fn remove(&mut self, id: u32) -> Option<Particle> {
        let idx = self.index.remove(&id)?;
        let particle = self.particles.remove(idx);
        for p in &self.particles[idx..] {
            if let Some(slot) = self.index.get_mut(&p.id) {
                *slot -= 1;
            }
        }
        Some(particle)
    }

    pub fn get(&self, id: u32) -> Option<&Particle> {
        self.index.get(&id).map(|&i| &self.particles[i])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Particle> {
        let i = *self.index.get(&id)?;
        Some(&mut self.particles[i])
    }

    /// Two disjoint mutable borrows, in the order asked for.
    ///
    /// `None` if the ids are equal or either is unknown.
    pub fn get_pair_mut(&mut self, a: u32, b: u32) -> Option<(&mut Particle, &mut Particle)> {
        if a == b {
            return None;
        }
        let ia = *self.index.get(&a)?;
        let ib = *self.index.get(&b)?;
        if ia < ib {
            let (lo, hi) = self.particles.split_at_mut(ib);
            Some((&mut lo[ia], &mut hi[0]))
        } else {
            let (lo, hi) = self.particles.split_at_mut(ia);
            Some((&mut hi[0], &mut lo[ib]))
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    /// Particles in ascending id order
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
