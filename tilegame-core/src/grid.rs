//! Board, score and merge-marker state.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, ValidationError};
use crate::Pos;

/// Cell value for an empty cell.
pub const EMPTY: u32 = 0;

/// Whether a cell may hold `value`: empty, or a power of two >= 2.
#[inline]
pub const fn is_valid_tile(value: u32) -> bool {
    value == EMPTY || (value >= 2 && value.is_power_of_two())
}

/// Serializable projection of a [`GridState`].
///
/// Field names match the persisted JSON record:
/// `{ board, score, mergedTiles, bestScore }`.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub board: Vec<Vec<u32>>,
    pub score: u64,
    /// Saved as `[]` by games that never moved; read back as all-false.
    #[serde(default)]
    pub merged_tiles: Vec<Vec<bool>>,
    pub best_score: u64,
}

impl Snapshot {
    /// Check that this snapshot fits a `rows × columns` board.
    pub fn validate(&self, rows: usize, columns: usize) -> Result<(), ValidationError> {
        if self.board.len() != rows {
            return Err(ValidationError::RowCount {
                expected: rows,
                found: self.board.len(),
            });
        }
        for (row, cells) in self.board.iter().enumerate() {
            if cells.len() != columns {
                return Err(ValidationError::JaggedRow {
                    row,
                    expected: columns,
                    found: cells.len(),
                });
            }
            if let Some(col) = cells.iter().position(|&v| !is_valid_tile(v)) {
                return Err(ValidationError::InvalidTile {
                    row,
                    col,
                    value: cells[col],
                });
            }
        }
        let markers_fit = self.merged_tiles.is_empty()
            || (self.merged_tiles.len() == rows
                && self.merged_tiles.iter().all(|r| r.len() == columns));
        if !markers_fit {
            return Err(ValidationError::MarkerShape { rows, columns });
        }
        if self.score > self.best_score {
            return Err(ValidationError::ScoreAboveBest {
                score: self.score,
                best_score: self.best_score,
            });
        }
        Ok(())
    }
}

/// The board, score, best score and merge markers of one game.
///
/// Dimensions are fixed by [`GridState::new`] / [`GridState::reset`].
/// Holds no move logic; see [`crate::engine`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GridState {
    rows: usize,
    columns: usize,
    cells: Vec<u32>,
    merged: Vec<bool>,
    score: u64,
    best_score: u64,
}

impl GridState {
    /// Create an all-empty board with zero score and best score.
    pub fn new(rows: usize, columns: usize) -> GridState {
        GridState {
            rows,
            columns,
            cells: vec![EMPTY; rows * columns],
            merged: vec![false; rows * columns],
            score: 0,
            best_score: 0,
        }
    }

    /// Build a board from row-major values. Score and best score start at zero.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<GridState, ValidationError> {
        let columns = rows.first().map_or(0, Vec::len);
        let snapshot = Snapshot {
            board: rows,
            score: 0,
            merged_tiles: Vec::new(),
            best_score: 0,
        };
        let mut grid = GridState::new(snapshot.board.len(), columns);
        grid.restore(&snapshot)?;
        Ok(grid)
    }

    /// Reallocate an empty `rows × columns` board and zero the score.
    /// The best score carries over.
    pub fn reset(&mut self, rows: usize, columns: usize) {
        self.rows = rows;
        self.columns = columns;
        self.cells = vec![EMPTY; rows * columns];
        self.merged = vec![false; rows * columns];
        self.score = 0;
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[inline]
    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Result<usize, IndexError> {
        if row < self.rows && col < self.columns {
            Ok(row * self.columns + col)
        } else {
            Err(IndexError {
                row,
                col,
                rows: self.rows,
                columns: self.columns,
            })
        }
    }

    /// Get the value at a cell.
    pub fn get_cell(&self, row: usize, col: usize) -> Result<u32, IndexError> {
        Ok(self.cells[self.index(row, col)?])
    }

    /// Set the value at a cell.
    pub fn set_cell(&mut self, row: usize, col: usize, value: u32) -> Result<(), IndexError> {
        debug_assert!(is_valid_tile(value), "invalid tile value {value}");
        let idx = self.index(row, col)?;
        self.cells[idx] = value;
        Ok(())
    }

    /// Add `delta` to the score, raising the best score if it is overtaken.
    pub fn add_score(&mut self, delta: u64) {
        self.score += delta;
        if self.score > self.best_score {
            self.best_score = self.score;
        }
    }

    /// Reset every merge marker to false.
    pub fn clear_merge_markers(&mut self) {
        self.merged.clear();
        self.merged.resize(self.rows * self.columns, false);
    }

    pub fn mark_merged(&mut self, row: usize, col: usize) -> Result<(), IndexError> {
        let idx = self.index(row, col)?;
        self.merged[idx] = true;
        Ok(())
    }

    pub fn is_merged(&self, row: usize, col: usize) -> Result<bool, IndexError> {
        Ok(self.merged[self.index(row, col)?])
    }

    // ========== Unchecked access for positions already known in-bounds ==========

    #[inline]
    pub(crate) fn at(&self, pos: Pos) -> u32 {
        self.cells[pos.row * self.columns + pos.col]
    }

    #[inline]
    pub(crate) fn put(&mut self, pos: Pos, value: u32) {
        self.cells[pos.row * self.columns + pos.col] = value;
    }

    #[inline]
    pub(crate) fn merged_at(&self, pos: Pos) -> bool {
        self.merged[pos.row * self.columns + pos.col]
    }

    #[inline]
    pub(crate) fn set_merged(&mut self, pos: Pos) {
        self.merged[pos.row * self.columns + pos.col] = true;
    }

    // ========== Queries ==========

    /// Iterate over all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let columns = self.columns;
        (0..self.rows * columns).map(move |i| Pos::new(i / columns, i % columns))
    }

    /// Empty positions in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(|&pos| self.at(pos) == EMPTY)
    }

    /// Number of non-empty cells.
    pub fn tile_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != EMPTY).count()
    }

    /// Largest tile on the board, or 0 when empty.
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(EMPTY)
    }

    /// Copy of the board as rows.
    pub fn board(&self) -> Vec<Vec<u32>> {
        if self.columns == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells.chunks(self.columns).map(<[u32]>::to_vec).collect()
    }

    /// Copy of the merge markers as rows.
    pub fn merge_markers(&self) -> Vec<Vec<bool>> {
        if self.columns == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.merged.chunks(self.columns).map(<[bool]>::to_vec).collect()
    }

    // ========== Snapshots ==========

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board(),
            score: self.score,
            merged_tiles: self.merge_markers(),
            best_score: self.best_score,
        }
    }

    /// Replace this state with `snapshot`.
    ///
    /// The snapshot must match this board's dimensions. Nothing is changed
    /// when validation fails.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), ValidationError> {
        snapshot.validate(self.rows, self.columns)?;

        self.cells = snapshot.board.iter().flatten().copied().collect();
        if snapshot.merged_tiles.is_empty() {
            self.clear_merge_markers();
        } else {
            self.merged = snapshot.merged_tiles.iter().flatten().copied().collect();
        }
        self.score = snapshot.score;
        self.best_score = snapshot.best_score;
        Ok(())
    }
}
