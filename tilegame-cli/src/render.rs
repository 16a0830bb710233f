//! Plain-text board rendering for the terminal.

use std::io::{self, Write};

use tilegame_core::{Direction, GridState, Renderer};

// ============================================================================
// Drawing
// ============================================================================

/// Draw the score line and the board, one row per line. Empty cells show
/// as "." and every cell is right-aligned to the widest tile.
pub fn draw(grid: &GridState) -> String {
    let width = grid.max_tile().to_string().len().max(1);
    let mut out = format!("Score: {}  Best: {}\n", grid.score(), grid.best_score());

    for row in grid.board() {
        let cells: Vec<String> = row
            .iter()
            .map(|&v| {
                let text = if v == 0 { ".".to_string() } else { v.to_string() };
                format!("{:>width$}", text, width = width)
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

// ============================================================================
// Renderer
// ============================================================================

/// Prints the board to stdout after every change
#[derive(Debug, Default)]
pub struct TextRenderer {
    last_direction: Option<Direction>,
}

impl Renderer for TextRenderer {
    fn render(&mut self, grid: &GridState) {
        let mut stdout = io::stdout().lock();
        let heading = match self.last_direction.take() {
            Some(direction) => format!("\n[{}]\n", direction),
            None => "\n".to_string(),
        };
        // A closed stdout leaves nothing to draw on
        let _ = write!(stdout, "{}{}", heading, draw(grid));
        let _ = stdout.flush();
    }

    fn transition(&mut self, direction: Direction) {
        self.last_direction = Some(direction);
    }
}
