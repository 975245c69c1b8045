use crate::grid::*;
use crate::location::*;
use serde::{Deserialize, Serialize};

/// Summary counts for a grid after (or during) planning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub towers: usize,
    /// Cells in range of some tower, including the tower cells themselves.
    pub covered: usize,
    pub blocked: usize,
    pub free_remaining: usize,
    /// Greedy iterations run; equals `towers` unless the grid came in with
    /// towers already placed.
    pub iterations: usize,
}

impl CoverageStats {
    pub fn from_grid(grid: &GridState, iterations: usize) -> Self {
        CoverageStats {
            towers: grid.count(CellMask::TOWER),
            covered: grid.count(CellMask::COVERED | CellMask::TOWER),
            blocked: grid.count(CellMask::BLOCKED),
            free_remaining: grid.free_count(),
            iterations,
        }
    }

    /// Fraction of unblocked cells that are covered. A fully blocked grid
    /// counts as fully covered.
    pub fn coverage_ratio(&self) -> f32 {
        let unblocked = self.covered + self.free_remaining;
        if unblocked == 0 {
            1.0
        } else {
            self.covered as f32 / unblocked as f32
        }
    }
}

/// The ordered tower placement produced by a planning run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerPlan {
    pub radius: usize,
    /// Tower sites in the order the greedy loop chose them.
    pub towers: Vec<Location>,
    /// Cells newly covered by each tower, parallel to `towers`.
    pub gains: Vec<usize>,
    pub stats: CoverageStats,
}

impl TowerPlan {
    pub fn len(&self) -> usize {
        self.towers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    /// Tower sites paired with the number of cells each one newly covered.
    pub fn placements(&self) -> impl Iterator<Item = (Location, usize)> + '_ {
        self.towers.iter().copied().zip(self.gains.iter().copied())
    }
}
