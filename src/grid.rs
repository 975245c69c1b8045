use crate::constants::*;
use crate::error::*;
use crate::location::*;
use bitflags::*;
use itertools::iproduct;
use log::*;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of cell states, used to filter grid queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CellMask: u8 {
        const BLOCKED = 1;
        const FREE = 2;
        const COVERED = 4;
        const TOWER = 8;
        const PLACEABLE = Self::FREE.bits() | Self::COVERED.bits();
    }
}

/// Classification of a single city block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Blocked,
    Free,
    Covered,
    Tower,
}

impl CellState {
    pub fn mask(self) -> CellMask {
        match self {
            CellState::Blocked => CellMask::BLOCKED,
            CellState::Free => CellMask::FREE,
            CellState::Covered => CellMask::COVERED,
            CellState::Tower => CellMask::TOWER,
        }
    }
}

/// The city grid: a row-major `height x width` array of [`CellState`].
///
/// Obstructions are fixed at construction. After that the only mutation is
/// [`GridState::place_tower`], which keeps the cell lifecycle invariants:
/// blocked cells never change, towers never change, and `Covered` is only
/// ever reached from `Free`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GridState {
    height: usize,
    width: usize,
    cells: Vec<CellState>,
}

pub(crate) fn validate_dimensions(height: usize, width: usize) -> Result<()> {
    if height == 0 || width == 0 {
        return Err(CoverageError::InvalidConfiguration(format!(
            "grid dimensions must be positive, got {}x{}",
            height, width
        )));
    }
    if height > MAX_DIMENSION || width > MAX_DIMENSION {
        return Err(CoverageError::InvalidConfiguration(format!(
            "grid dimensions must not exceed {}, got {}x{}",
            MAX_DIMENSION, height, width
        )));
    }
    Ok(())
}

impl GridState {
    /// Create a grid with every cell `Free`.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        validate_dimensions(height, width)?;
        Ok(GridState {
            height,
            width,
            cells: vec![CellState::Free; height * width],
        })
    }

    /// Create a grid with the given `(row, col)` cells blocked and everything
    /// else `Free`. Duplicates are ignored; out-of-bounds cells are rejected.
    pub fn with_obstructions<I>(height: usize, width: usize, blocked: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut grid = Self::new(height, width)?;
        for (row, col) in blocked {
            if !grid.in_bounds(row, col) {
                return Err(CoverageError::InvalidConfiguration(format!(
                    "obstruction ({}, {}) lies outside the {}x{} grid",
                    row, col, height, width
                )));
            }
            let index = grid.index(row, col);
            grid.cells[index] = CellState::Blocked;
        }
        Ok(grid)
    }

    /// Parse a grid from ASCII rows: `#` blocked, `.` free, `+` covered, `T` tower.
    /// Whitespace between cells is ignored. Mostly useful for fixtures.
    pub fn from_ascii(text: &str) -> Result<Self> {
        let rows: Vec<Vec<CellState>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| match c {
                        '#' => Ok(CellState::Blocked),
                        '.' => Ok(CellState::Free),
                        '+' => Ok(CellState::Covered),
                        'T' => Ok(CellState::Tower),
                        other => Err(CoverageError::InvalidConfiguration(format!(
                            "unknown cell glyph '{}'",
                            other
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        validate_dimensions(height, width)?;
        if rows.iter().any(|r| r.len() != width) {
            return Err(CoverageError::InvalidConfiguration(
                "grid rows must all have the same width".to_string(),
            ));
        }

        Ok(GridState {
            height,
            width,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of cells, `height * width`.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    pub fn get(&self, loc: Location) -> Option<CellState> {
        self.get_xy(loc.row(), loc.col())
    }

    pub fn get_xy(&self, row: usize, col: usize) -> Option<CellState> {
        if self.in_bounds(row, col) {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Row-major iterator over every cell.
    pub fn iter(&self) -> impl Iterator<Item = (Location, CellState)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, state)| (Location::new(i / width, i % width), *state))
    }

    /// Number of cells whose state is in `mask`.
    pub fn count(&self, mask: CellMask) -> usize {
        self.cells
            .iter()
            .filter(|state| mask.contains(state.mask()))
            .count()
    }

    /// Row-major locations of every cell whose state is in `mask`.
    pub fn locations(&self, mask: CellMask) -> Vec<Location> {
        self.iter()
            .filter(|(_, state)| mask.contains(state.mask()))
            .map(|(loc, _)| loc)
            .collect()
    }

    pub fn towers(&self) -> Vec<Location> {
        self.locations(CellMask::TOWER)
    }

    /// Number of unobstructed cells not yet within any tower's range.
    pub fn free_count(&self) -> usize {
        self.count(CellMask::FREE)
    }

    pub fn is_fully_covered(&self) -> bool {
        self.free_count() == 0
    }

    /// A tower can stand on any in-bounds cell that is neither blocked nor
    /// already a tower. Cells covered by another tower are fine.
    pub fn is_placeable(&self, row: usize, col: usize) -> bool {
        self.get_xy(row, col)
            .map(|state| CellMask::PLACEABLE.contains(state.mask()))
            .unwrap_or(false)
    }

    /// All in-bounds cells within Chebyshev distance `radius` of `(row, col)`,
    /// in row-major order. The square is clipped at the grid edges.
    pub fn footprint(
        &self,
        row: usize,
        col: usize,
        radius: usize,
    ) -> impl Iterator<Item = Location> {
        let row_end = row.saturating_add(radius).saturating_add(1).min(self.height);
        let col_end = col.saturating_add(radius).saturating_add(1).min(self.width);
        let rows = row.saturating_sub(radius)..row_end;
        let cols = col.saturating_sub(radius)..col_end;
        iproduct!(rows, cols).map(|(r, c)| Location::new(r, c))
    }

    /// Place a tower at `(row, col)`.
    ///
    /// Every `Free` cell in the footprint becomes `Covered` and the target
    /// becomes `Tower`. Returns the cells that left the `Free` state, in
    /// row-major order.
    pub fn place_tower(&mut self, row: usize, col: usize, radius: usize) -> Result<Vec<Location>> {
        if !self.is_placeable(row, col) {
            return Err(CoverageError::InvalidPlacement { row, col });
        }

        let mut newly_covered = Vec::new();
        for loc in self.footprint(row, col, radius).collect::<Vec<_>>() {
            let index = self.index(loc.row(), loc.col());
            if self.cells[index] == CellState::Free {
                self.cells[index] = if loc.row() == row && loc.col() == col {
                    CellState::Tower
                } else {
                    CellState::Covered
                };
                newly_covered.push(loc);
            }
        }

        let target = self.index(row, col);
        self.cells[target] = CellState::Tower;

        trace!(
            "Placed tower at ({}, {}) radius {}: {} cells newly covered",
            row,
            col,
            radius,
            newly_covered.len()
        );

        Ok(newly_covered)
    }
}

#[derive(Deserialize)]
struct RawGridState {
    height: usize,
    width: usize,
    cells: Vec<CellState>,
}

impl<'de> Deserialize<'de> for GridState {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawGridState::deserialize(deserializer)?;
        validate_dimensions(raw.height, raw.width).map_err(serde::de::Error::custom)?;
        if raw.cells.len() != raw.height * raw.width {
            return Err(serde::de::Error::custom("Invalid grid cell array size"));
        }
        Ok(GridState {
            height: raw.height,
            width: raw.width,
            cells: raw.cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(matches!(
            GridState::new(0, 5),
            Err(CoverageError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            GridState::new(5, 0),
            Err(CoverageError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_new_rejects_oversized_dimensions() {
        assert!(GridState::new(MAX_DIMENSION + 1, 1).is_err());
    }

    #[test]
    fn test_with_obstructions() {
        let grid =
            GridState::with_obstructions(3, 4, [(0, 1), (2, 3), (0, 1)]).unwrap();
        assert_eq!(grid.cell_count(), 12);
        assert_eq!(grid.count(CellMask::BLOCKED), 2);
        assert_eq!(grid.get_xy(0, 1), Some(CellState::Blocked));
        assert_eq!(grid.get_xy(2, 3), Some(CellState::Blocked));
        assert_eq!(grid.free_count(), 10);
    }

    #[test]
    fn test_with_obstructions_out_of_bounds() {
        let result = GridState::with_obstructions(3, 3, [(3, 0)]);
        assert!(matches!(result, Err(CoverageError::InvalidConfiguration(_))));

        // Must not wrap around to (5, 3) when packed.
        let result = GridState::with_obstructions(10, 10, [(65541, 3)]);
        assert!(matches!(result, Err(CoverageError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_from_ascii() {
        let grid = GridState::from_ascii(
            "
            . # .
            + T .
            ",
        )
        .unwrap();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get_xy(0, 1), Some(CellState::Blocked));
        assert_eq!(grid.get_xy(1, 0), Some(CellState::Covered));
        assert_eq!(grid.towers(), vec![Location::new(1, 1)]);
    }

    #[test]
    fn test_from_ascii_ragged_rows() {
        assert!(GridState::from_ascii("...\n..").is_err());
        assert!(GridState::from_ascii("..x").is_err());
        assert!(GridState::from_ascii("").is_err());
    }

    #[test]
    fn test_is_placeable() {
        let grid = GridState::from_ascii("# . + T").unwrap();
        assert!(!grid.is_placeable(0, 0));
        assert!(grid.is_placeable(0, 1));
        assert!(grid.is_placeable(0, 2));
        assert!(!grid.is_placeable(0, 3));
        assert!(!grid.is_placeable(0, 4));
        assert!(!grid.is_placeable(1, 0));
    }

    #[test]
    fn test_footprint_interior() {
        let grid = GridState::new(5, 5).unwrap();
        let cells: Vec<_> = grid.footprint(2, 2, 1).collect();
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], Location::new(1, 1));
        assert_eq!(cells[8], Location::new(3, 3));
        assert!(cells
            .iter()
            .all(|loc| loc.distance_to(Location::new(2, 2)) <= 1));
    }

    #[test]
    fn test_footprint_clipped_at_edges() {
        let grid = GridState::new(4, 6).unwrap();
        let corner: Vec<_> = grid.footprint(0, 0, 2).collect();
        assert_eq!(corner.len(), 9);

        let far: Vec<_> = grid.footprint(3, 5, 1).collect();
        assert_eq!(
            far,
            vec![
                Location::new(2, 4),
                Location::new(2, 5),
                Location::new(3, 4),
                Location::new(3, 5)
            ]
        );
    }

    #[test]
    fn test_footprint_radius_zero_and_huge() {
        let grid = GridState::new(3, 3).unwrap();
        assert_eq!(
            grid.footprint(1, 2, 0).collect::<Vec<_>>(),
            vec![Location::new(1, 2)]
        );
        assert_eq!(grid.footprint(1, 1, usize::MAX).count(), 9);
    }

    #[test]
    fn test_place_tower_covers_free_cells() {
        let mut grid = GridState::from_ascii(
            "
            . . . .
            . # . .
            . . . .
            ",
        )
        .unwrap();

        let newly = grid.place_tower(1, 2, 1).unwrap();
        // 3x3 window at columns 1..=3, minus the blocked cell.
        assert_eq!(newly.len(), 8);
        assert!(newly.contains(&Location::new(1, 2)));
        assert_eq!(grid.get_xy(1, 2), Some(CellState::Tower));
        assert_eq!(grid.get_xy(1, 1), Some(CellState::Blocked));
        assert_eq!(grid.get_xy(0, 3), Some(CellState::Covered));
        assert_eq!(grid.get_xy(0, 0), Some(CellState::Free));
        assert_eq!(grid.free_count(), 3);
    }

    #[test]
    fn test_place_tower_on_covered_cell() {
        let mut grid = GridState::new(1, 5).unwrap();
        grid.place_tower(0, 0, 1).unwrap();
        assert_eq!(grid.get_xy(0, 1), Some(CellState::Covered));

        let newly = grid.place_tower(0, 1, 1).unwrap();
        assert_eq!(newly, vec![Location::new(0, 2)]);
        assert_eq!(grid.get_xy(0, 0), Some(CellState::Tower));
        assert_eq!(grid.get_xy(0, 1), Some(CellState::Tower));
        assert_eq!(grid.get_xy(0, 2), Some(CellState::Covered));
    }

    #[test]
    fn test_place_tower_rejects_blocked_and_tower() {
        let mut grid = GridState::from_ascii("# .").unwrap();
        assert_eq!(
            grid.place_tower(0, 0, 1),
            Err(CoverageError::InvalidPlacement { row: 0, col: 0 })
        );
        assert_eq!(grid.get_xy(0, 1), Some(CellState::Free));

        grid.place_tower(0, 1, 0).unwrap();
        assert!(grid.place_tower(0, 1, 0).is_err());
        assert!(grid.place_tower(5, 5, 0).is_err());
    }

    #[test]
    fn test_place_tower_leaves_distant_cells() {
        let mut grid = GridState::new(7, 7).unwrap();
        let before = grid.clone();
        grid.place_tower(3, 3, 2).unwrap();
        for (loc, state) in grid.iter() {
            if loc.distance_to(Location::new(3, 3)) > 2 {
                assert_eq!(Some(state), before.get(loc));
            } else {
                assert_ne!(state, CellState::Free);
            }
        }
    }

    #[test]
    fn test_serde_roundtrip_validates_size() {
        let grid = GridState::from_ascii("# .\n. T").unwrap();
        let yaml = serde_yaml::to_string(&grid).unwrap();
        let parsed: GridState = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, grid);

        let bad = "height: 2\nwidth: 2\ncells: [Free]\n";
        assert!(serde_yaml::from_str::<GridState>(bad).is_err());
    }
}
