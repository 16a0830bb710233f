//! WASM bindings for tilegame-core
//!
//! Provides a JavaScript-friendly API for the engine. Saving to browser
//! storage is left to the host page via `exportState` / `importState`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use crate::engine::{apply_move, MoveResult};
use crate::grid::{GridState, Snapshot};
use crate::spawn::seed_board;
use crate::{can_move, Direction, Gesture};

/// WASM-friendly wrapper around a game board
#[wasm_bindgen]
pub struct WasmGame {
    grid: GridState,
    rng: StdRng,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game with two opening tiles. The seed drives tile spawning.
    #[wasm_bindgen(constructor)]
    pub fn new(rows: usize, columns: usize, seed: u64) -> WasmGame {
        let mut game = WasmGame {
            grid: GridState::new(rows, columns),
            rng: StdRng::seed_from_u64(seed),
        };
        seed_board(&mut game.grid, &mut game.rng);
        game
    }

    /// Start over, keeping the best score
    pub fn reset(&mut self) {
        let (rows, columns) = (self.grid.rows(), self.grid.columns());
        self.grid.reset(rows, columns);
        seed_board(&mut self.grid, &mut self.rng);
    }

    /// Move in a direction ("up", "down", "left", "right" or "ArrowUp" etc).
    /// Returns { changed, gameOver, merges, points, spawned }, or null for an
    /// unknown direction.
    #[wasm_bindgen(js_name = move)]
    pub fn move_tiles(&mut self, direction: &str) -> JsValue {
        match Direction::from_key(direction) {
            Some(direction) => self.apply(direction),
            None => JsValue::NULL,
        }
    }

    /// Resolve a swipe from start to end point and move
    pub fn swipe(&mut self, start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> JsValue {
        let gesture = Gesture::new((start_x, start_y), (end_x, end_y));
        self.apply(gesture.direction())
    }

    /// Check if any move is still possible
    #[wasm_bindgen(js_name = canMove)]
    pub fn can_move(&self) -> bool {
        can_move(&self.grid)
    }

    /// Board as an array of rows
    pub fn board(&self) -> JsValue {
        to_js(&self.grid.board())
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn score(&self) -> u64 {
        self.grid.score()
    }

    #[wasm_bindgen(js_name = bestScore)]
    pub fn best_score(&self) -> u64 {
        self.grid.best_score()
    }

    /// Snapshot as { board, score, mergedTiles, bestScore }
    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> JsValue {
        to_js(&self.grid.snapshot())
    }

    /// Restore a snapshot. Returns false if it does not fit this board.
    #[wasm_bindgen(js_name = importState)]
    pub fn import_state(&mut self, state: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<Snapshot>(state) {
            Ok(snapshot) => self.grid.restore(&snapshot).is_ok(),
            Err(_) => false,
        }
    }
}

impl WasmGame {
    fn apply(&mut self, direction: Direction) -> JsValue {
        let result: MoveResult = apply_move(&mut self.grid, direction, &mut self.rng);
        to_js(&result)
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}
