//! Demo configuration, loadable from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::*;
use crate::grid::{validate_dimensions, GridState};
use crate::obstruction::validate_blocked_percentage;
use crate::pipeline::ScanStrategy;
use crate::planner::CoveragePlanner;
use crate::visual::GlyphSet;

/// Parameters for one simulated city.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    pub height: usize,
    pub width: usize,
    /// Percentage of cells to block, in `[0, 100]`.
    pub blocked_percentage: f64,
    /// Tower coverage half-width in cells.
    pub radius: usize,
    /// Seed for the obstruction layout; random if unset.
    pub seed: Option<u64>,
    pub glyphs: GlyphSet,
    pub strategy: ScanStrategy,
}

impl Default for CityConfig {
    fn default() -> Self {
        CityConfig {
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            blocked_percentage: DEFAULT_BLOCKED_PERCENTAGE,
            radius: DEFAULT_RADIUS,
            seed: None,
            glyphs: GlyphSet::default(),
            strategy: ScanStrategy::default(),
        }
    }
}

impl CityConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CoverageError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&contents)
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: CityConfig =
            serde_yaml::from_str(yaml).map_err(|e| CoverageError::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.height, self.width)?;
        validate_blocked_percentage(self.blocked_percentage)
    }

    /// Build a randomly obstructed grid from these settings.
    pub fn build_grid(&self) -> Result<GridState> {
        self.validate()?;
        GridState::random(self.height, self.width, self.blocked_percentage, self.seed)
    }

    pub fn planner(&self) -> CoveragePlanner {
        CoveragePlanner::new(self.radius).strategy(self.strategy)
    }
}
