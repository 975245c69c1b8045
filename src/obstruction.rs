//! Random obstruction layouts for new city grids.
//!
//! The target number of blocked cells is `floor(height * width * pct / 100)`.
//! Cells are drawn without replacement, so the target is always met exactly
//! and no sample is ever wasted on an already-blocked cell.

use crate::constants::*;
use crate::error::*;
use crate::grid::*;
use crate::location::*;
use itertools::iproduct;
use log::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Supplies the set of blocked cells for a new grid.
pub trait ObstructionSource {
    /// Pick `count` distinct in-bounds cells of a `height x width` grid.
    fn obstructions(&mut self, height: usize, width: usize, count: usize) -> Vec<Location>;
}

/// Uniform sampling without replacement over every grid coordinate.
pub struct RandomObstructions<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomObstructions<R> {
    pub fn new(rng: R) -> Self {
        RandomObstructions { rng }
    }
}

impl RandomObstructions<StdRng> {
    /// Reproducible layouts for a given seed.
    pub fn seeded(seed: u64) -> Self {
        RandomObstructions::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        RandomObstructions::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> ObstructionSource for RandomObstructions<R> {
    fn obstructions(&mut self, height: usize, width: usize, count: usize) -> Vec<Location> {
        let mut all: Vec<Location> = iproduct!(0..height, 0..width)
            .map(Location::from)
            .collect();
        let count = count.min(all.len());
        let (chosen, _) = all.partial_shuffle(&mut self.rng, count);
        chosen.to_vec()
    }
}

/// Check a blocked-cell percentage is a number in `[0, 100]`.
pub fn validate_blocked_percentage(blocked_percentage: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&blocked_percentage) {
        return Err(CoverageError::InvalidConfiguration(format!(
            "blocked percentage must be between 0 and 100, got {}",
            blocked_percentage
        )));
    }
    Ok(())
}

impl GridState {
    /// Build a grid whose blocked cells come from `source`.
    pub fn generate<S>(
        height: usize,
        width: usize,
        blocked_percentage: f64,
        source: &mut S,
    ) -> Result<Self>
    where
        S: ObstructionSource + ?Sized,
    {
        validate_blocked_percentage(blocked_percentage)?;
        // Reject bad dimensions before asking the source for cells.
        GridState::new(height, width)?;

        let target = blocked_cell_target(height, width, blocked_percentage);
        let blocked = source.obstructions(height, width, target);

        let grid = GridState::with_obstructions(
            height,
            width,
            blocked.into_iter().map(|loc| (loc.row(), loc.col())),
        )?;
        debug!(
            "Generated {}x{} grid: {} of {} cells blocked",
            height,
            width,
            grid.count(CellMask::BLOCKED),
            grid.cell_count()
        );
        Ok(grid)
    }

    /// Build a randomly obstructed grid. A `seed` makes the layout reproducible.
    pub fn random(
        height: usize,
        width: usize,
        blocked_percentage: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut source = match seed {
            Some(seed) => RandomObstructions::seeded(seed),
            None => RandomObstructions::from_os_rng(),
        };
        Self::generate(height, width, blocked_percentage, &mut source)
    }
}
