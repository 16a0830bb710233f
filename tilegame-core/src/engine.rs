//! Directional slide-and-merge.
//!
//! # Traversal Order
//!
//! ```text
//! direction  primary axis      secondary axis  step
//! up         rows 0 → N-1      columns         (-1,  0)
//! down       rows N-1 → 0      columns         (+1,  0)
//! left       columns 0 → N-1   rows            ( 0, -1)
//! right      columns N-1 → 0   rows            ( 0, +1)
//! ```
//!
//! Tiles nearest the target edge are processed first, so a tile that already
//! moved or merged this pass is never picked up again as a source.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{GridState, EMPTY};
use crate::legality::can_move;
use crate::spawn::{spawn_tile, Spawned};
use crate::{Direction, Pos};

/// Tally of one slide pass.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SlideStats {
    /// Any tile changed position or value.
    pub changed: bool,
    /// Merges performed.
    pub merges: u32,
    /// Sum of merged tile values (added to the score).
    pub points: u64,
}

/// Outcome of one move attempt.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    /// The board changed and a tile was spawned.
    pub changed: bool,
    /// No move was possible; the board was left untouched.
    pub game_over: bool,
    pub merges: u32,
    pub points: u64,
    pub spawned: Option<Spawned>,
}

/// Slide and merge every tile toward `direction`. Updates score and merge
/// markers; never spawns.
///
/// A tile slides across empty cells until it meets the edge or another tile.
/// It merges into an equal tile when neither cell has merged this pass, then
/// stops. Merge markers are not cleared here.
pub fn slide(grid: &mut GridState, direction: Direction) -> SlideStats {
    let rows = grid.rows();
    let columns = grid.columns();
    let delta = direction.delta();
    let (primary_len, secondary_len) = if direction.is_vertical() {
        (rows, columns)
    } else {
        (columns, rows)
    };

    let mut stats = SlideStats::default();

    for primary in 0..primary_len {
        let line = if direction.toward_origin() {
            primary
        } else {
            primary_len - 1 - primary
        };

        for secondary in 0..secondary_len {
            let start = if direction.is_vertical() {
                Pos::new(line, secondary)
            } else {
                Pos::new(secondary, line)
            };
            if grid.at(start) == EMPTY {
                continue;
            }

            let mut current = start;
            while let Some(next) = current.step(delta, rows, columns) {
                let value = grid.at(current);
                let target = grid.at(next);

                if target == EMPTY {
                    grid.put(next, value);
                    grid.put(current, EMPTY);
                    current = next;
                    stats.changed = true;
                } else if target == value && !grid.merged_at(current) && !grid.merged_at(next) {
                    let Some(merged) = value.checked_mul(2) else {
                        break;
                    };
                    grid.put(next, merged);
                    grid.put(current, EMPTY);
                    grid.set_merged(next);
                    grid.add_score(merged as u64);
                    stats.changed = true;
                    stats.merges += 1;
                    stats.points += merged as u64;
                    break;
                } else {
                    break;
                }
            }
        }
    }

    stats
}

/// Execute a full move: legality gate, slide, and one spawn on change.
///
/// Merge markers are cleared before the attempt and again after spawning.
pub fn apply_move<R: Rng + ?Sized>(
    grid: &mut GridState,
    direction: Direction,
    rng: &mut R,
) -> MoveResult {
    grid.clear_merge_markers();

    if !can_move(grid) {
        debug!(%direction, score = grid.score(), "no move possible");
        return MoveResult {
            game_over: true,
            ..MoveResult::default()
        };
    }

    let stats = slide(grid, direction);
    let mut result = MoveResult {
        changed: stats.changed,
        game_over: false,
        merges: stats.merges,
        points: stats.points,
        spawned: None,
    };

    if stats.changed {
        grid.clear_merge_markers();
        result.spawned = spawn_tile(grid, rng);
    }

    debug!(
        %direction,
        changed = result.changed,
        merges = result.merges,
        points = result.points,
        score = grid.score(),
        "move applied"
    );
    result
}
