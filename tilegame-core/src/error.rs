//! Error types for grid access, snapshot validation and persistence.

use thiserror::Error;

/// A cell coordinate outside `[0, rows) × [0, columns)`.
///
/// Always a caller bug; normal play never produces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cell ({row}, {col}) is outside the {rows}x{columns} board")]
pub struct IndexError {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub columns: usize,
}

/// A snapshot or row set whose shape or contents cannot become a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    JaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("merge markers do not match the {rows}x{columns} board")]
    MarkerShape { rows: usize, columns: usize },
    #[error("cell ({row}, {col}) holds {value}, which is not a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: u32 },
    #[error("score {score} exceeds best score {best_score}")]
    ScoreAboveBest { score: u64, best_score: u64 },
}

/// Unrecognised direction name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction {0:?}")]
pub struct UnknownDirection(pub String);

/// The backing key-value store could not be read or written.
#[derive(Debug, Error)]
#[error("key-value store unavailable: {source}")]
pub struct StoreError {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> StoreError {
        StoreError {
            source: source.into(),
        }
    }
}

/// Failure saving or restoring a snapshot.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Unavailable(#[from] StoreError),
    #[error("malformed snapshot record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("rejected snapshot: {0}")]
    Invalid(#[from] ValidationError),
}
