//! Engine Property Testing
//!
//! Plays seeded random games and checks after every move that:
//! - Every non-empty cell is a power of two >= 2
//! - The best score never falls below the score
//! - An unchanged move leaves the whole state untouched and spawns nothing
//! - A changed move adds exactly one tile beyond what merging removed
//! - Merge markers are cleared once the move completes
//! - No move performs more merges than half the tiles present before it
//! - Snapshots survive a JSON round-trip

use rand::prelude::*;

use tilegame_core::grid::is_valid_tile;
use tilegame_core::{apply_move, can_move, seed_board, slide, Direction, GridState, Snapshot};

/// Board layouts exercised by the random games
const SHAPES: [(usize, usize); 5] = [(4, 4), (3, 3), (2, 5), (5, 2), (1, 4)];

fn grid(rows: Vec<Vec<u32>>) -> GridState {
    GridState::from_rows(rows).expect("valid test board")
}

fn check_invariants(state: &GridState, context: &str) {
    for row in state.board() {
        for value in row {
            assert!(is_valid_tile(value), "{context}: bad tile {value}");
        }
    }
    assert!(
        state.best_score() >= state.score(),
        "{context}: best {} < score {}",
        state.best_score(),
        state.score()
    );
}

#[test]
fn test_random_games_hold_invariants() {
    let mut rng = StdRng::seed_from_u64(0x2048);
    let mut games = 0;
    let mut total_moves = 0;

    for &(rows, columns) in SHAPES.iter().cycle().take(60) {
        let mut state = GridState::new(rows, columns);
        seed_board(&mut state, &mut rng);
        games += 1;

        for step in 0..500 {
            let context = format!("game {games} ({rows}x{columns}) step {step}");
            let direction = Direction::all().choose(&mut rng).unwrap();
            let before = state.clone();
            let tiles_before = before.tile_count();
            let score_before = before.score();

            let result = apply_move(&mut state, direction, &mut rng);
            total_moves += 1;
            check_invariants(&state, &context);

            if result.game_over {
                assert!(!can_move(&before), "{context}: game over on movable board");
                assert_eq!(state, before, "{context}: game over mutated the board");
                break;
            }

            if result.changed {
                let expected = tiles_before - result.merges as usize
                    + usize::from(result.spawned.is_some());
                assert_eq!(state.tile_count(), expected, "{context}: tile count");
                assert!(result.spawned.is_some() || state.empty_cells().count() == 0);
                assert_eq!(state.score(), score_before + result.points, "{context}: score");
                assert!(
                    state.merge_markers().iter().flatten().all(|&m| !m),
                    "{context}: markers left set"
                );
            } else {
                assert_eq!(state, before, "{context}: unchanged move mutated state");
                assert!(result.spawned.is_none());
                assert_eq!(result.points, 0);
            }

            assert!(
                result.merges as usize <= tiles_before / 2,
                "{context}: {} merges from {tiles_before} tiles",
                result.merges
            );
        }
    }

    assert!(total_moves > 1000, "too few moves played: {total_moves}");
}

#[test]
fn test_random_snapshots_roundtrip() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut state = GridState::new(4, 4);
    seed_board(&mut state, &mut rng);

    for _ in 0..200 {
        let direction = Direction::all().choose(&mut rng).unwrap();
        if apply_move(&mut state, direction, &mut rng).game_over {
            break;
        }
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        let snapshot: Snapshot = serde_json::from_str(&json).unwrap();
        let mut restored = GridState::new(4, 4);
        restored.restore(&snapshot).unwrap();
        assert_eq!(restored, state);
    }
}

// ========== Worked scenarios ==========

#[test]
fn test_pair_merges_left_and_spawns() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut state = grid(vec![
        vec![2, 2, 0, 0],
        vec![0, 0, 0, 0],
        vec![0, 0, 0, 0],
        vec![0, 0, 0, 0],
    ]);
    let result = apply_move(&mut state, Direction::Left, &mut rng);

    assert!(result.changed);
    assert_eq!(state.score(), 4);
    assert_eq!(state.get_cell(0, 0), Ok(4));
    let spawned = result.spawned.unwrap();
    assert!(spawned.value == 2 || spawned.value == 4);
    assert_eq!(state.tile_count(), 2);
    let row: Vec<u32> = state.board()[0].clone();
    // Anything else in row 0 is the spawned tile
    assert_eq!(row.iter().filter(|&&v| v != 0).count(), if spawned.pos.row == 0 { 2 } else { 1 });
}

#[test]
fn test_single_row_gap_merge_then_still() {
    let mut state = grid(vec![vec![2, 0, 2, 0]]);
    let first = slide(&mut state, Direction::Left);
    assert!(first.changed);
    assert_eq!(state.board(), vec![vec![4, 0, 0, 0]]);

    state.clear_merge_markers();
    let before = state.clone();
    let second = slide(&mut state, Direction::Left);
    assert!(!second.changed);
    assert_eq!(state, before);

    // Same through the full move path: nothing spawns
    let mut rng = StdRng::seed_from_u64(1);
    let result = apply_move(&mut state, Direction::Left, &mut rng);
    assert!(!result.changed);
    assert_eq!(result.spawned, None);
    assert_eq!(state, before);
}

#[test]
fn test_stuck_board_reports_game_over() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut state = grid(vec![
        vec![2, 4, 8, 16],
        vec![16, 8, 4, 2],
        vec![2, 4, 8, 16],
        vec![16, 8, 4, 2],
    ]);
    assert!(!can_move(&state));
    let before = state.clone();
    for direction in Direction::all() {
        let result = apply_move(&mut state, direction, &mut rng);
        assert!(result.game_over);
        assert_eq!(state, before);
    }
}

#[test]
fn test_checkerboard_up_is_unchanged() {
    let mut state = grid(vec![vec![2, 4], vec![4, 2]]);
    let before = state.clone();
    let stats = slide(&mut state, Direction::Up);
    assert!(!stats.changed);
    assert_eq!(state, before);

    let mut rng = StdRng::seed_from_u64(1);
    let result = apply_move(&mut state, Direction::Up, &mut rng);
    assert!(!result.changed);
    assert_eq!(state, before);
}

#[test]
fn test_reads_browser_saved_record() {
    // Record as written by the browser game before its first move
    let json = concat!(
        r#"{"board":[[0,2,0,0],[0,0,0,0],[0,0,4,0],[0,0,0,0]],"#,
        r#""score":0,"mergedTiles":[],"bestScore":1024}"#
    );
    let snapshot: Snapshot = serde_json::from_str(json).unwrap();
    let mut state = GridState::new(4, 4);
    state.restore(&snapshot).unwrap();
    assert_eq!(state.best_score(), 1024);
    assert_eq!(state.tile_count(), 2);
}
