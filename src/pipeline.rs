use crate::coverage_index::*;
use crate::error::*;
use crate::grid::*;
use crate::location::*;
use crate::plan::*;
use fnv::FnvHashSet;
use log::*;
use serde::{Deserialize, Serialize};

/// Work budget for incremental planning.
pub struct CpuBudget {
    /// Function that returns true if the planner should continue working.
    should_continue: Box<dyn Fn() -> bool>,
}

impl CpuBudget {
    pub fn new<F: Fn() -> bool + 'static>(should_continue: F) -> Self {
        CpuBudget {
            should_continue: Box::new(should_continue),
        }
    }

    /// Returns true if there is budget remaining to continue work.
    pub fn has_budget(&self) -> bool {
        (self.should_continue)()
    }

    /// Unlimited budget (run to completion).
    pub fn unlimited() -> Self {
        CpuBudget {
            should_continue: Box::new(|| true),
        }
    }
}

/// How each greedy iteration finds the best tower site.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStrategy {
    /// Recompute every candidate's footprint against the uncovered set.
    #[default]
    FullRescan,
    /// Keep per-site gains in a [`MarginalCoverageIndex`].
    Incremental,
}

/// Outcome of a single greedy iteration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    Placed { location: Location, gain: usize },
    Finished,
}

/// An in-progress greedy run. Must be stepped against the grid it was
/// started on.
pub struct PlanRun {
    radius: usize,
    strategy: ScanStrategy,
    towers: Vec<Location>,
    gains: Vec<usize>,
    index: Option<MarginalCoverageIndex>,
}

impl PlanRun {
    pub fn new(grid: &GridState, radius: usize, strategy: ScanStrategy) -> Self {
        let index = match strategy {
            ScanStrategy::FullRescan => None,
            ScanStrategy::Incremental => Some(MarginalCoverageIndex::new(grid, radius)),
        };
        PlanRun {
            radius,
            strategy,
            towers: Vec::new(),
            gains: Vec::new(),
            index,
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    /// Towers placed so far, in placement order.
    pub fn towers(&self) -> &[Location] {
        &self.towers
    }

    /// Place the next tower, or report that nothing is left to cover.
    pub fn step(&mut self, grid: &mut GridState) -> Result<StepResult> {
        let remaining = grid.free_count();
        if remaining == 0 {
            return Ok(StepResult::Finished);
        }

        let best = match &self.index {
            Some(index) => index.best(grid),
            None => select_full_rescan(grid, self.radius),
        };

        let (location, gain) = match best {
            Some(best) => best,
            None => {
                warn!(
                    "CoveragePlanner: no site improves coverage with {} cells uncovered",
                    remaining
                );
                return Ok(StepResult::Finished);
            }
        };

        let newly_covered = grid.place_tower(location.row(), location.col(), self.radius)?;
        debug_assert_eq!(newly_covered.len(), gain);
        if let Some(index) = &mut self.index {
            index.mark_covered(grid, &newly_covered);
        }

        self.towers.push(location);
        self.gains.push(gain);

        debug!(
            "CoveragePlanner: tower {} at {} covers {} new cells ({} remaining)",
            self.towers.len(),
            location,
            gain,
            remaining - gain
        );

        Ok(StepResult::Placed { location, gain })
    }

    /// Close out the run, producing the final plan.
    pub fn finish(self, grid: &GridState) -> TowerPlan {
        let stats = CoverageStats::from_grid(grid, self.towers.len());
        info!(
            "CoveragePlanner: placed {} towers (radius {}), {} cells covered, {} blocked, {} uncovered",
            stats.iterations, self.radius, stats.covered, stats.blocked, stats.free_remaining
        );
        TowerPlan {
            radius: self.radius,
            towers: self.towers,
            gains: self.gains,
            stats,
        }
    }
}

/// Full rescan selection: for every placeable site, count the footprint cells
/// that are still uncovered and keep the first strict maximum in row-major
/// order. Tower cells are not placeable, so a site is never chosen twice.
fn select_full_rescan(grid: &GridState, radius: usize) -> Option<(Location, usize)> {
    let uncovered: FnvHashSet<Location> = grid.locations(CellMask::FREE).into_iter().collect();

    let mut best = None;
    let mut best_gain = 0;
    for (loc, state) in grid.iter() {
        if !CellMask::PLACEABLE.contains(state.mask()) {
            continue;
        }
        let gain = grid
            .footprint(loc.row(), loc.col(), radius)
            .filter(|cell| uncovered.contains(cell))
            .count();
        if gain > best_gain {
            best = Some(loc);
            best_gain = gain;
        }
    }
    best.map(|loc| (loc, best_gain))
}

/// The planning state machine.
pub enum PlanningState {
    /// Uncovered free cells remain.
    Planning(PlanRun),
    /// Terminal state.
    Done(TowerPlan),
}

impl PlanningState {
    pub fn is_done(&self) -> bool {
        matches!(self, PlanningState::Done(_))
    }
}

/// Run greedy iterations until the budget is exhausted or the grid is covered.
/// At least one iteration runs per call so every tick makes progress.
pub fn tick_pipeline(
    state: PlanningState,
    grid: &mut GridState,
    budget: &CpuBudget,
) -> Result<PlanningState> {
    match state {
        PlanningState::Done(plan) => Ok(PlanningState::Done(plan)),
        PlanningState::Planning(mut run) => loop {
            match run.step(grid)? {
                StepResult::Finished => return Ok(PlanningState::Done(run.finish(grid))),
                StepResult::Placed { .. } => {
                    if !budget.has_budget() {
                        return Ok(PlanningState::Planning(run));
                    }
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_step_places_best_site() {
        let mut grid = GridState::new(3, 3).unwrap();
        let mut run = PlanRun::new(&grid, 1, ScanStrategy::FullRescan);
        assert_eq!(
            run.step(&mut grid).unwrap(),
            StepResult::Placed {
                location: Location::new(1, 1),
                gain: 9
            }
        );
        assert_eq!(run.step(&mut grid).unwrap(), StepResult::Finished);
        assert_eq!(run.towers(), &[Location::new(1, 1)]);
    }

    #[test]
    fn test_full_rescan_counts_only_free_cells() {
        let grid = GridState::from_ascii(
            "
            + + . .
            + T . .
            ",
        )
        .unwrap();
        // (0, 2) and (1, 2) both see all four free cells; (0, 2) wins the tie.
        assert_eq!(
            select_full_rescan(&grid, 1),
            Some((Location::new(0, 2), 4))
        );
    }

    #[test]
    fn test_full_rescan_none_when_covered() {
        let grid = GridState::from_ascii("# + T").unwrap();
        assert_eq!(select_full_rescan(&grid, 3), None);
    }

    #[test]
    fn test_tick_respects_budget() {
        let mut grid = GridState::new(1, 5).unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        // Allow one extra placement per tick.
        let budget = CpuBudget::new(move || {
            counter.set(counter.get() + 1);
            counter.get() % 2 == 1
        });

        let mut state = PlanningState::Planning(PlanRun::new(&grid, 0, ScanStrategy::FullRescan));
        let mut ticks = 0;
        while !state.is_done() {
            state = tick_pipeline(state, &mut grid, &budget).unwrap();
            ticks += 1;
        }

        match state {
            PlanningState::Done(plan) => assert_eq!(plan.len(), 5),
            PlanningState::Planning(_) => unreachable!(),
        }
        assert_eq!(ticks, 3);
        assert!(grid.is_fully_covered());
    }

    #[test]
    fn test_tick_on_done_is_noop() {
        let mut grid = GridState::new(1, 1).unwrap();
        let run = PlanRun::new(&grid, 0, ScanStrategy::Incremental);
        let state = tick_pipeline(
            PlanningState::Planning(run),
            &mut grid,
            &CpuBudget::unlimited(),
        )
        .unwrap();
        let state = tick_pipeline(state, &mut grid, &CpuBudget::unlimited()).unwrap();
        match state {
            PlanningState::Done(plan) => assert_eq!(plan.towers, vec![Location::new(0, 0)]),
            PlanningState::Planning(_) => panic!("expected a finished plan"),
        }
    }

    #[test]
    fn test_scan_strategy_yaml_names() {
        let parsed: ScanStrategy = serde_yaml::from_str("incremental").unwrap();
        assert_eq!(parsed, ScanStrategy::Incremental);
        assert_eq!(
            serde_yaml::to_string(&ScanStrategy::FullRescan).unwrap().trim(),
            "full_rescan"
        );
    }
}
