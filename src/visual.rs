use super::grid::*;
use super::location::*;
use serde::{Deserialize, Serialize};

pub trait GridVisualizer {
    fn render(&mut self, location: Location, state: CellState);

    /// Called once after the last cell of each row.
    fn end_row(&mut self, _row: usize) {}
}

/// Symbols used by [`TextRenderer`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphSet {
    #[default]
    Emoji,
    Ascii,
}

impl GlyphSet {
    pub fn glyph(self, state: CellState) -> &'static str {
        match (self, state) {
            (GlyphSet::Emoji, CellState::Blocked) => "❌",
            (GlyphSet::Emoji, CellState::Free) => "🟥",
            (GlyphSet::Emoji, CellState::Covered) => "🟩",
            (GlyphSet::Emoji, CellState::Tower) => "🗼",
            (GlyphSet::Ascii, CellState::Blocked) => "#",
            (GlyphSet::Ascii, CellState::Free) => ".",
            (GlyphSet::Ascii, CellState::Covered) => "+",
            (GlyphSet::Ascii, CellState::Tower) => "T",
        }
    }
}

/// Renders a grid as space-separated glyphs, one line per row.
pub struct TextRenderer {
    glyphs: GlyphSet,
    rows: Vec<Vec<&'static str>>,
}

impl TextRenderer {
    pub fn new(glyphs: GlyphSet) -> Self {
        TextRenderer {
            glyphs,
            rows: vec![Vec::new()],
        }
    }

    pub fn finish(self) -> String {
        self.rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl GridVisualizer for TextRenderer {
    fn render(&mut self, _location: Location, state: CellState) {
        let glyph = self.glyphs.glyph(state);
        if let Some(row) = self.rows.last_mut() {
            row.push(glyph);
        }
    }

    fn end_row(&mut self, _row: usize) {
        self.rows.push(Vec::new());
    }
}

impl GridState {
    /// Feed every cell to a visualizer in row-major order.
    pub fn visualize<V: GridVisualizer>(&self, visualizer: &mut V) {
        for (location, state) in self.iter() {
            visualizer.render(location, state);
            if location.col() + 1 == self.width() {
                visualizer.end_row(location.row());
            }
        }
    }

    pub fn render_text(&self, glyphs: GlyphSet) -> String {
        let mut renderer = TextRenderer::new(glyphs);
        self.visualize(&mut renderer);
        renderer.finish()
    }
}

impl std::fmt::Display for GridState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_text(GlyphSet::Ascii))
    }
}
