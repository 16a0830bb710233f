//! Keyboard commands, yes/no prompts and game-over notices.

use std::io::{self, BufRead, Write};

use tilegame_core::{Confirmer, Direction, GameEvent, Notifier, Prompt};

/// One line of player input
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    Reset,
    Help,
    Quit,
}

impl Command {
    /// Parse a line of input. Accepts wasd, hjkl, direction names such as
    /// "left" or "ArrowLeft", and raw arrow-key escape sequences.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let command = match line {
            "w" | "k" | "\x1b[A" => Command::Move(Direction::Up),
            "s" | "j" | "\x1b[B" => Command::Move(Direction::Down),
            "d" | "l" | "\x1b[C" => Command::Move(Direction::Right),
            "a" | "h" | "\x1b[D" => Command::Move(Direction::Left),
            "r" | "reset" => Command::Reset,
            "?" | "help" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            other => return Direction::from_key(other).map(Command::Move),
        };
        Some(command)
    }
}

pub const HELP: &str = "\
Moves: w/a/s/d, h/j/k/l, arrow keys or up/down/left/right, then Enter
r: new game   ?: help   q: quit";

// ============================================================================
// Confirmer
// ============================================================================

/// Asks yes/no questions on stdin. With `assume_yes` every question is
/// answered yes without reading input.
pub struct StdinConfirmer {
    assume_yes: bool,
}

impl StdinConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// "y" or "yes" in any case
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl Confirmer for StdinConfirmer {
    fn ask(&mut self, prompt: Prompt) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", prompt.message());
        let _ = io::stdout().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Prints game-over notices and rings the terminal bell
#[derive(Debug, Default)]
pub struct BellNotifier;

/// Text shown for an event
pub fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::GameOver { score, best_score } => {
            format!("Game over, you lost! Score: {} (best {})", score, best_score)
        }
    }
}

impl Notifier for BellNotifier {
    fn notify(&mut self, event: GameEvent) {
        println!("{}\x07", describe(&event));
    }
}
