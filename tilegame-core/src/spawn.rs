//! Random tile placement.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::grid::GridState;
use crate::Pos;

/// Chance that a spawned tile is a 4 rather than a 2.
pub const FOUR_PROBABILITY: f64 = 0.1;

/// Tiles placed on a fresh board.
pub const INITIAL_TILES: usize = 2;

/// A tile placed by [`spawn_tile`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Spawned {
    pub pos: Pos,
    pub value: u32,
}

/// Place one tile on a uniformly chosen empty cell: a 2 with probability
/// 0.9, otherwise a 4. Does nothing on a full board.
pub fn spawn_tile<R: Rng + ?Sized>(grid: &mut GridState, rng: &mut R) -> Option<Spawned> {
    let empty: Vec<Pos> = grid.empty_cells().collect();
    let &pos = empty.choose(rng)?;
    let value = if rng.random_bool(FOUR_PROBABILITY) { 4 } else { 2 };
    grid.put(pos, value);
    trace!(row = pos.row, col = pos.col, value, "spawned tile");
    Some(Spawned { pos, value })
}

/// Place the opening tiles on a fresh board. Returns how many were placed.
pub fn seed_board<R: Rng + ?Sized>(grid: &mut GridState, rng: &mut R) -> usize {
    (0..INITIAL_TILES)
        .filter_map(|_| spawn_tile(grid, rng))
        .count()
}
