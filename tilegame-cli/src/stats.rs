//! Play statistics for a terminal session.

use std::time::Instant;

use tilegame_core::MoveResult;

/// Counters collected while playing.
#[derive(Debug, Default)]
pub struct PlayStats {
    /// Moves that changed the board
    pub moves: u64,

    /// Moves that changed nothing
    pub blocked: u64,

    /// Total merges and the points they scored
    pub merges: u64,
    pub points: u64,

    /// Games that ended with no move left
    pub games_lost: u64,

    /// Highest tile seen on the board
    pub max_tile: u32,

    start_time: Option<Instant>,
}

impl PlayStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record the outcome of one move and the largest tile after it
    pub fn record(&mut self, result: &MoveResult, max_tile: u32) {
        if result.game_over {
            self.games_lost += 1;
        } else if result.changed {
            self.moves += 1;
        } else {
            self.blocked += 1;
        }
        self.merges += u64::from(result.merges);
        self.points += result.points;
        self.max_tile = self.max_tile.max(max_tile);
    }

    /// Seconds since the session started
    pub fn elapsed_secs(&self) -> u64 {
        self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0)
    }

    /// Lines printed when the player quits
    pub fn summary(&self) -> Vec<String> {
        let elapsed = self.elapsed_secs();
        vec![
            format!("Moves: {}", self.moves),
            format!("Blocked moves: {}", self.blocked),
            format!("Merges: {}", self.merges),
            format!("Points scored: {}", self.points),
            format!("Games lost: {}", self.games_lost),
            format!("Highest tile: {}", self.max_tile),
            format!(
                "Time played: {:02}:{:02}:{:02}",
                elapsed / 3600,
                (elapsed % 3600) / 60,
                elapsed % 60
            ),
        ]
    }

    /// Print final summary
    pub fn print_summary(&self) {
        for line in self.summary() {
            println!("{}", line);
        }
    }
}
