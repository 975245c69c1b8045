//! Public API for the coverage planner.
//!
//! `CoveragePlanner` configures a greedy maximum-coverage run and produces a
//! `PlanningState` that can be ticked incrementally or run to completion.
//! The planner holds no grid; it borrows one mutably for each run.

use crate::error::*;
use crate::grid::*;
use crate::pipeline::{tick_pipeline, CpuBudget, PlanRun, PlanningState, ScanStrategy};

// Re-export key types for convenience
pub use crate::pipeline::{PlanningState as PlanState, StepResult};
pub use crate::plan::{CoverageStats, TowerPlan};

/// Greedy tower placement with a fixed coverage radius.
///
/// Each iteration picks the site whose square footprint covers the most
/// still-uncovered cells, breaking ties by the first site in row-major
/// order, until every unblocked cell is covered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CoveragePlanner {
    radius: usize,
    strategy: ScanStrategy,
}

impl CoveragePlanner {
    pub fn new(radius: usize) -> Self {
        CoveragePlanner {
            radius,
            strategy: ScanStrategy::default(),
        }
    }

    /// Choose how candidate sites are scored (default: full rescan).
    /// Both strategies produce the same plan.
    pub fn strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Begin a run. A grid with no free cells starts out `Done`.
    pub fn start(&self, grid: &GridState) -> PlanningState {
        let run = PlanRun::new(grid, self.radius, self.strategy);
        if grid.free_count() == 0 {
            PlanningState::Done(run.finish(grid))
        } else {
            PlanningState::Planning(run)
        }
    }

    /// Run one tick of planning with the given budget.
    pub fn tick(
        &self,
        state: PlanningState,
        grid: &mut GridState,
        budget: &CpuBudget,
    ) -> Result<PlanningState> {
        tick_pipeline(state, grid, budget)
    }

    /// Run planning to completion, marking towers and coverage on `grid`.
    pub fn plan(&self, grid: &mut GridState) -> Result<TowerPlan> {
        let budget = CpuBudget::unlimited();
        let mut state = self.start(grid);

        loop {
            state = tick_pipeline(state, grid, &budget)?;
            if let PlanningState::Done(plan) = state {
                return Ok(plan);
            }
        }
    }

    /// Run planning until `should_continue` returns false.
    /// Returns `Ok(None)` if the budget ran out before the grid was covered;
    /// towers placed so far stay on the grid. The budget is asked once per
    /// placed tower.
    pub fn plan_with_budget<F>(
        &self,
        grid: &mut GridState,
        should_continue: F,
    ) -> Result<Option<TowerPlan>>
    where
        F: Fn() -> bool + 'static,
    {
        let budget = CpuBudget::new(should_continue);
        let state = self.start(grid);

        // A tick only hands back `Planning` once the budget has said stop.
        match tick_pipeline(state, grid, &budget)? {
            PlanningState::Done(plan) => Ok(Some(plan)),
            PlanningState::Planning(_) => Ok(None),
        }
    }
}

/// Plan towers on `grid` with the default strategy.
pub fn plan(grid: &mut GridState, radius: usize) -> Result<TowerPlan> {
    CoveragePlanner::new(radius).plan(grid)
}
