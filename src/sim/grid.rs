//! Uniform-grid spatial hash (broad phase)
//!
//! Maps integer cell coordinates to the ids occupying them. The grid never
//! holds particle data, only membership. Ordered maps keep pair enumeration
//! deterministic from run to run.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Integer cell coordinate `(floor(x / cell_size), floor(y / cell_size))`
pub type CellCoord = (i32, i32);

/// Which cells contribute candidate pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PairScope {
    /// Pairs sharing a cell only. Misses overlaps straddling a cell edge.
    #[default]
    SameCell,
    /// Same-cell pairs plus pairs across the 8 surrounding cells
    Neighborhood,
}

/// Half of the 8-neighborhood; the other half is covered from the other side
const FORWARD_NEIGHBORS: [CellCoord; 4] = [(1, 0), (1, 1), (0, 1), (-1, 1)];

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: BTreeMap<CellCoord, BTreeSet<u32>>,
    /// Total tracked ids across all cells
    count: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(PhysicsError::config(format!(
                "cell_size must be finite and > 0, got {cell_size}"
            )));
        }
        Ok(Self {
            cell_size,
            cells: BTreeMap::new(),
            count: 0,
        })
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Out-of-range coordinates saturate to the edge cells
    #[inline]
    pub fn cell_of(&self, position: Vec2) -> CellCoord {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Add `id` to the cell containing `position`. No-op if already there.
    pub fn insert(&mut self, id: u32, position: Vec2) {
        let cell = self.cell_of(position);
        if self.cells.entry(cell).or_default().insert(id) {
            self.count += 1;
        }
    }

    /// Move `id` from the cell of `old` to the cell of `new`.
    ///
    /// Same cell is the common case and touches nothing. Fails with
    /// `UnknownId` (grid unchanged) if `id` is not in the old cell.
    pub fn relocate(&mut self, id: u32, old: Vec2, new: Vec2) -> Result<()> {
        let from = self.cell_of(old);
        let to = self.cell_of(new);
        if from == to {
            return Ok(());
        }
        self.take(id, from)?;
        if self.cells.entry(to).or_default().insert(id) {
            self.count += 1;
        }
        Ok(())
    }

    /// Drop `id` from the cell containing `position`
    pub fn remove(&mut self, id: u32, position: Vec2) -> Result<()> {
        let cell = self.cell_of(position);
        self.take(id, cell)
    }

    fn take(&mut self, id: u32, cell: CellCoord) -> Result<()> {
        let members = self
            .cells
            .get_mut(&cell)
            .ok_or(PhysicsError::UnknownId { id, cell })?;
        if !members.remove(&id) {
            return Err(PhysicsError::UnknownId { id, cell });
        }
        if members.is_empty() {
            self.cells.remove(&cell);
        }
        self.count -= 1;
        Ok(())
    }

    /// Call `f(a, b)` once per unordered candidate pair
    pub fn for_each_candidate_pair<F>(&self, scope: PairScope, mut f: F)
    where
        F: FnMut(u32, u32),
    {
        for (&(cx, cy), members) in &self.cells {
            for (i, &a) in members.iter().enumerate() {
                for &b in members.iter().skip(i + 1) {
                    f(a, b);
                }
            }

            if scope == PairScope::Neighborhood {
                for (dx, dy) in FORWARD_NEIGHBORS {
                    // Cells at the edge of the i32 range have no neighbor past it
                    let (Some(nx), Some(ny)) = (cx.checked_add(dx), cy.checked_add(dy)) else {
                        continue;
                    };
                    let Some(others) = self.cells.get(&(nx, ny)) else {
                        continue;
                    };
                    for &a in members {
                        for &b in others {
                            f(a, b);
                        }
                    }
                }
            }
        }
    }

    /// Collected form of `for_each_candidate_pair`
    pub fn candidate_pairs(&self, scope: PairScope) -> Vec<(u32, u32)> {
        let mut pairs = Vec::new();
        self.for_each_candidate_pair(scope, |a, b| pairs.push((a, b)));
        pairs
    }

    /// Ids in `cell`, if it is occupied
    pub fn members(&self, cell: CellCoord) -> Option<&BTreeSet<u32>> {
        self.cells.get(&cell)
    }

    /// Linear scan for the cell holding `id`
    pub fn cell_containing(&self, id: u32) -> Option<CellCoord> {
        self.cells
            .iter()
            .find(|(_, members)| members.contains(&id))
            .map(|(&cell, _)| cell)
    }

    /// Every (cell, id) membership, ordered by cell then id
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        self.cells
            .iter()
            .flat_map(|(&cell, members)| members.iter().map(move |&id| (cell, id)))
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of tracked ids
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(10.0).unwrap()
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        assert!(SpatialGrid::new(0.0).is_err());
        assert!(SpatialGrid::new(-5.0).is_err());
        assert!(SpatialGrid::new(f32::NAN).is_err());
    }

    #[test]
    fn test_cell_of_floors_negative_coordinates() {
        let g = grid();
        assert_eq!(g.cell_of(Vec2::new(0.0, 0.0)), (0, 0));
        assert_eq!(g.cell_of(Vec2::new(9.99, 10.0)), (0, 1));
        assert_eq!(g.cell_of(Vec2::new(-0.1, -10.0)), (-1, -1));
        assert_eq!(g.cell_of(Vec2::new(-10.1, 25.0)), (-2, 2));
    }

    #[test]
    fn test_insert_is_idempotent_in_same_cell() {
        let mut g = grid();
        g.insert(1, Vec2::new(1.0, 1.0));
        g.insert(1, Vec2::new(2.0, 2.0));
        assert_eq!(g.len(), 1);
        assert_eq!(g.members((0, 0)).unwrap().len(), 1);
    }

    #[test]
    fn test_relocate_same_cell_is_noop() {
        let mut g = grid();
        g.insert(1, Vec2::new(1.0, 1.0));
        g.relocate(1, Vec2::new(1.0, 1.0), Vec2::new(8.0, 8.0)).unwrap();
        assert_eq!(g.cell_containing(1), Some((0, 0)));
    }

    #[test]
    fn test_relocate_moves_between_cells_and_drops_empty() {
        let mut g = grid();
        g.insert(1, Vec2::new(1.0, 1.0));
        g.relocate(1, Vec2::new(1.0, 1.0), Vec2::new(15.0, 1.0)).unwrap();
        assert_eq!(g.cell_containing(1), Some((1, 0)));
        assert_eq!(g.iter().collect::<Vec<_>>(), vec![((1, 0), 1)]);
        assert!(g.members((0, 0)).is_none());
        assert_eq!(g.occupied_cells(), 1);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_relocate_from_wrong_cell_is_unknown_id() {
        let mut g = grid();
        g.insert(1, Vec2::new(1.0, 1.0));
        let err = g
            .relocate(1, Vec2::new(25.0, 25.0), Vec2::new(1.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, PhysicsError::UnknownId { id: 1, cell: (2, 2) }));
        // Untouched
        assert_eq!(g.cell_containing(1), Some((0, 0)));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_relocate_unknown_id_in_occupied_cell() {
        let mut g = grid();
        g.insert(1, Vec2::new(1.0, 1.0));
        let err = g.relocate(2, Vec2::new(1.0, 1.0), Vec2::new(15.0, 1.0));
        assert!(matches!(err, Err(PhysicsError::UnknownId { id: 2, .. })));
        assert!(g.cell_containing(2).is_none());
    }

    #[test]
    fn test_remove() {
        let mut g = grid();
        g.insert(1, Vec2::new(1.0, 1.0));
        g.remove(1, Vec2::new(1.0, 1.0)).unwrap();
        assert!(g.is_empty());
        assert!(g.remove(1, Vec2::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_same_cell_pairs_reported_once() {
        let mut g = grid();
        for id in 1..=4 {
            g.insert(id, Vec2::new(id as f32, 1.0));
        }
        g.insert(5, Vec2::new(50.0, 50.0));

        let mut pairs = g.candidate_pairs(PairScope::SameCell);
        pairs.sort();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)]);
    }

    #[test]
    fn test_same_cell_misses_straddling_pair() {
        let mut g = grid();
        g.insert(1, Vec2::new(9.5, 5.0));
        g.insert(2, Vec2::new(10.5, 5.0));
        assert!(g.candidate_pairs(PairScope::SameCell).is_empty());
        assert_eq!(g.candidate_pairs(PairScope::Neighborhood), vec![(1, 2)]);
    }

    #[test]
    fn test_neighborhood_reports_each_pair_once() {
        let mut g = grid();
        // 3x3 block of cells, one id each, plus a second id in the center
        let mut id = 1;
        for cy in 0..3 {
            for cx in 0..3 {
                g.insert(id, Vec2::new(cx as f32 * 10.0 + 5.0, cy as f32 * 10.0 + 5.0));
                id += 1;
            }
        }
        g.insert(100, Vec2::new(15.0, 15.0));

        let pairs = g.candidate_pairs(PairScope::Neighborhood);
        let mut normalized: Vec<(u32, u32)> =
            pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
        normalized.sort();
        let before = normalized.len();
        normalized.dedup();
        assert_eq!(before, normalized.len(), "duplicate pair reported");

        // Center id 5 and 100 neighbor everything: 8 + 8 + (5,100)
        assert!(normalized.contains(&(5, 100)));
        assert!(normalized.contains(&(1, 100)));
        assert!(normalized.contains(&(9, 100)));
        // Corners 1 and 9 are two cells apart
        assert!(!normalized.contains(&(1, 9)));
    }

    #[test]
    fn test_len_matches_memberships_after_relocate_onto_existing() {
        let mut g = grid();
        // Same id indexed twice, in two cells
        g.insert(1, Vec2::new(1.0, 1.0));
        g.insert(1, Vec2::new(15.0, 1.0));
        assert_eq!(g.len(), 2);

        g.relocate(1, Vec2::new(1.0, 1.0), Vec2::new(15.0, 1.0)).unwrap();
        assert_eq!(g.len(), g.iter().count());
        assert_eq!(g.iter().collect::<Vec<_>>(), vec![((1, 0), 1)]);
    }

    #[test]
    fn test_saturated_cells_do_not_overflow_neighborhood() {
        let mut g = SpatialGrid::new(1.0).unwrap();
        g.insert(1, Vec2::new(3.0e9, 3.0e9));
        g.insert(2, Vec2::new(4.0e9, 3.0e9));
        assert_eq!(g.cell_of(Vec2::new(3.0e9, 3.0e9)), (i32::MAX, i32::MAX));
        assert_eq!(g.occupied_cells(), 1);
        assert_eq!(g.candidate_pairs(PairScope::Neighborhood), vec![(1, 2)]);

        g.insert(3, Vec2::new(-3.0e9, 3.0e9));
        let pairs = g.candidate_pairs(PairScope::Neighborhood);
        assert_eq!(pairs, vec![(1, 2)]);
    }
}
