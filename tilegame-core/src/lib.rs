//! Sliding-tile merge puzzle engine (2048-style).
//!
//! # Board Representation
//!
//! ```text
//! rows × columns cells, row-major, each a u32:
//!   0       = empty
//!   2^k     = tile (k >= 1)
//!
//! Cell indices for a 4x4 board:
//!   (0,0)  (0,1)  (0,2)  (0,3)
//!   (1,0)  (1,1)  (1,2)  (1,3)
//!   (2,0)  (2,1)  (2,2)  (2,3)
//!   (3,0)  (3,1)  (3,2)  (3,3)
//! ```
//!
//! A same-shaped grid of merge markers records which cells were produced by a
//! merge during the current move. It is cleared at the start of every move and
//! again after spawning.
//!
//! # Move Pipeline
//!
//! ```text
//! Direction ──▶ legality::can_move ──(false)──▶ game over, board untouched
//!                      │ (true)
//!                      ▼
//!               engine::slide ──(unchanged)──▶ done, nothing spawned
//!                      │ (changed)
//!                      ▼
//!               spawn::spawn_tile ──▶ session saves the Snapshot
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod engine;
pub mod error;
pub mod grid;
pub mod legality;
pub mod persist;
pub mod session;
pub mod spawn;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use engine::{apply_move, slide, MoveResult, SlideStats};
pub use error::{IndexError, PersistError, StoreError, UnknownDirection, ValidationError};
pub use grid::{GridState, Snapshot};
pub use legality::can_move;
pub use persist::{KeyValueStore, MemoryStore, PersistenceAdapter, STATE_KEY};
pub use session::{Confirmer, GameEvent, Notifier, Prompt, Renderer, Session};
pub use spawn::{seed_board, spawn_tile, Spawned};

/// Direction a move pushes the tiles.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Row/column step of a tile travelling in this direction.
    #[inline]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Tiles travel along columns.
    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Tiles travel toward index 0 (up or left).
    #[inline]
    pub const fn toward_origin(self) -> bool {
        matches!(self, Direction::Up | Direction::Left)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Get all directions as an iterator.
    pub fn all() -> impl Iterator<Item = Direction> {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
        .into_iter()
    }

    /// Parse a keyboard key name ("ArrowUp") or a bare name ("up").
    pub fn from_key(key: &str) -> Option<Direction> {
        let name = key.strip_prefix("Arrow").unwrap_or(key);
        match name.to_ascii_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Direction, UnknownDirection> {
        Direction::from_key(s.trim()).ok_or_else(|| UnknownDirection(s.to_string()))
    }
}

/// Cell position on the board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Pos {
        Pos { row, col }
    }

    /// Step one cell by `delta`. Returns None when the step leaves a
    /// `rows × columns` board.
    #[inline]
    pub fn step(self, delta: (isize, isize), rows: usize, columns: usize) -> Option<Pos> {
        let row = self.row.checked_add_signed(delta.0)?;
        let col = self.col.checked_add_signed(delta.1)?;
        (row < rows && col < columns).then_some(Pos { row, col })
    }
}

/// Touch gesture from a start point to an end point, in screen
/// coordinates (y grows downward).
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gesture {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Gesture {
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Gesture {
        Gesture {
            start_x: start.0,
            start_y: start.1,
            end_x: end.0,
            end_y: end.1,
        }
    }

    /// Direction of the swipe.
    pub fn direction(&self) -> Direction {
        resolve_direction(self.end_x - self.start_x, self.end_y - self.start_y)
    }
}

/// Map a displacement to a direction.
///
/// Horizontal only when `|dx| > |dy|`; equal magnitudes (including a zero
/// displacement) resolve vertically.
pub fn resolve_direction(dx: f64, dy: f64) -> Direction {
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}
