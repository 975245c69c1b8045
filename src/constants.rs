/// Largest supported grid dimension; `Location` packs each axis into 16 bits.
pub const MAX_DIMENSION: usize = u16::MAX as usize;

pub const DEFAULT_HEIGHT: usize = 6;
pub const DEFAULT_WIDTH: usize = 6;
pub const DEFAULT_BLOCKED_PERCENTAGE: f64 = 20.0;
pub const DEFAULT_RADIUS: usize = 2;

/// Number of cells to block for a grid of the given size.
/// Rounds down, matching `floor(height * width * percentage / 100)`.
pub fn blocked_cell_target(height: usize, width: usize, blocked_percentage: f64) -> usize {
    ((height * width) as f64 * blocked_percentage / 100.0).floor() as usize
}
