//! Game-over detection.

use crate::grid::{GridState, EMPTY};
use crate::Pos;

/// Whether any move can still change the board.
///
/// True when a cell is empty or equals its left or upper neighbour. Equality
/// between neighbours is symmetric, so checking each cell against the cell
/// before it on both axes covers every adjacent pair once.
pub fn can_move(grid: &GridState) -> bool {
    grid.positions().any(|pos| {
        let value = grid.at(pos);
        value == EMPTY
            || (pos.col > 0 && value == grid.at(Pos::new(pos.row, pos.col - 1)))
            || (pos.row > 0 && value == grid.at(Pos::new(pos.row - 1, pos.col)))
    })
}
