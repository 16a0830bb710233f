//! Session controller: owns one game and wires it to its collaborators.
//!
//! Presentation, confirmation dialogs and notifications stay outside the
//! engine behind the [`Renderer`], [`Confirmer`] and [`Notifier`] traits.

use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::engine::{apply_move, MoveResult};
use crate::error::{PersistError, ValidationError};
use crate::grid::{GridState, Snapshot};
use crate::persist::{KeyValueStore, PersistenceAdapter};
use crate::spawn::seed_board;
use crate::{Direction, Gesture};

/// Draws the game. Called after every move attempt, reset and load.
pub trait Renderer {
    fn render(&mut self, grid: &GridState);

    /// Replay a directional transition after a board-changing move.
    fn transition(&mut self, _direction: Direction) {}
}

/// Yes/no questions put to the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Prompt {
    ResetGame,
    RestoreProgress,
}

impl Prompt {
    pub fn message(self) -> &'static str {
        match self {
            Prompt::ResetGame => "Do you want to reset your game?",
            Prompt::RestoreProgress => "Do you want to restore your progress?",
        }
    }
}

pub trait Confirmer {
    fn ask(&mut self, prompt: Prompt) -> bool;
}

/// Events surfaced to the player outside the board itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameOver { score: u64, best_score: u64 },
}

pub trait Notifier {
    fn notify(&mut self, event: GameEvent);
}

impl Renderer for () {
    fn render(&mut self, _grid: &GridState) {}
}

impl Notifier for () {
    fn notify(&mut self, _event: GameEvent) {}
}

/// Fixed answer to every prompt.
impl Confirmer for bool {
    fn ask(&mut self, _prompt: Prompt) -> bool {
        *self
    }
}

/// One game session.
pub struct Session<S> {
    grid: GridState,
    persistence: PersistenceAdapter<S>,
    rng: StdRng,
    renderer: Box<dyn Renderer + Send>,
    notifier: Box<dyn Notifier + Send>,
}

impl<S: KeyValueStore> Session<S> {
    /// Create a session with an empty `rows × columns` board. Call
    /// [`Session::start`] or [`Session::reset_game`] to place tiles.
    pub fn new(rows: usize, columns: usize, store: S, rng: StdRng) -> Session<S> {
        Session {
            grid: GridState::new(rows, columns),
            persistence: PersistenceAdapter::new(store),
            rng,
            renderer: Box::new(()),
            notifier: Box::new(()),
        }
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + Send + 'static) -> Session<S> {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + Send + 'static) -> Session<S> {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut PersistenceAdapter<S> {
        &mut self.persistence
    }

    /// Open the session: offer to restore saved progress, otherwise start
    /// a fresh game. Returns true when progress was restored.
    pub fn start(&mut self, confirmer: &mut dyn Confirmer) -> bool {
        if self.persistence.has_saved() && confirmer.ask(Prompt::RestoreProgress) {
            if self.load_game_state() {
                return true;
            }
            warn!("saved progress could not be restored, starting a new game");
        }
        self.reset_game();
        false
    }

    // ========== Moves ==========

    /// Attempt a move. Saves progress when the board changed and notifies
    /// game over when no move is possible.
    pub fn move_tiles(&mut self, direction: Direction) -> MoveResult {
        let result = apply_move(&mut self.grid, direction, &mut self.rng);

        if result.game_over {
            info!(score = self.grid.score(), "game over");
            self.notifier.notify(GameEvent::GameOver {
                score: self.grid.score(),
                best_score: self.grid.best_score(),
            });
        } else if result.changed {
            self.save();
            self.renderer.transition(direction);
        }

        self.renderer.render(&self.grid);
        result
    }

    pub fn move_up(&mut self) -> MoveResult {
        self.move_tiles(Direction::Up)
    }

    pub fn move_down(&mut self) -> MoveResult {
        self.move_tiles(Direction::Down)
    }

    pub fn move_left(&mut self) -> MoveResult {
        self.move_tiles(Direction::Left)
    }

    pub fn move_right(&mut self) -> MoveResult {
        self.move_tiles(Direction::Right)
    }

    /// Resolve a swipe and move in its direction.
    pub fn swipe(&mut self, gesture: Gesture) -> (Direction, MoveResult) {
        let direction = gesture.direction();
        (direction, self.move_tiles(direction))
    }

    /// No move can change the board.
    pub fn is_game_over(&self) -> bool {
        !crate::can_move(&self.grid)
    }

    // ========== Reset / restore ==========

    /// Drop saved progress and start over with two tiles. The best score
    /// survives.
    pub fn reset_game(&mut self) {
        if let Err(err) = self.persistence.clear() {
            warn!(%err, "could not clear saved progress");
        }
        let (rows, columns) = (self.grid.rows(), self.grid.columns());
        self.grid.reset(rows, columns);
        seed_board(&mut self.grid, &mut self.rng);
        info!(best_score = self.grid.best_score(), "new game");
        self.renderer.render(&self.grid);
    }

    /// Ask before resetting. Returns whether the reset happened.
    pub fn reset_confirm(&mut self, confirmer: &mut dyn Confirmer) -> bool {
        let confirmed = confirmer.ask(Prompt::ResetGame);
        if confirmed {
            self.reset_game();
        }
        confirmed
    }

    /// Restore saved progress. Any store, decoding or validation failure is
    /// logged and leaves the current game in place. Renders either way.
    pub fn load_game_state(&mut self) -> bool {
        let restored = match self.try_load() {
            Ok(restored) => restored,
            Err(err) => {
                warn!(%err, "ignoring saved progress");
                false
            }
        };
        self.renderer.render(&self.grid);
        restored
    }

    fn try_load(&mut self) -> Result<bool, PersistError> {
        let Some(snapshot) = self.persistence.load()? else {
            return Ok(false);
        };
        self.grid.restore(&snapshot)?;
        info!(score = self.grid.score(), "restored saved progress");
        Ok(true)
    }

    /// Replace the game with `snapshot` and save it.
    pub fn import(&mut self, snapshot: &Snapshot) -> Result<(), ValidationError> {
        self.grid.restore(snapshot)?;
        self.save();
        self.renderer.render(&self.grid);
        Ok(())
    }

    pub fn export(&self) -> Snapshot {
        self.grid.snapshot()
    }

    fn save(&mut self) {
        if let Err(err) = self.persistence.save(&self.grid.snapshot()) {
            warn!(%err, "progress not saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Log {
        renders: usize,
        transitions: Vec<Direction>,
        events: Vec<GameEvent>,
        prompts: Vec<Prompt>,
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Log>>);

    impl Recorder {
        fn log(&self) -> std::sync::MutexGuard<'_, Log> {
            self.0.lock().unwrap()
        }
    }

    impl Renderer for Recorder {
        fn render(&mut self, _grid: &GridState) {
            self.log().renders += 1;
        }

        fn transition(&mut self, direction: Direction) {
            self.log().transitions.push(direction);
        }
    }

    impl Notifier for Recorder {
        fn notify(&mut self, event: GameEvent) {
            self.log().events.push(event);
        }
    }

    struct Answer(bool, Recorder);

    impl Confirmer for Answer {
        fn ask(&mut self, prompt: Prompt) -> bool {
            self.1.log().prompts.push(prompt);
            self.0
        }
    }

    fn session(store: MemoryStore) -> (Session<MemoryStore>, Recorder) {
        let recorder = Recorder::default();
        let session = Session::new(4, 4, store, StdRng::seed_from_u64(42))
            .with_renderer(recorder.clone())
            .with_notifier(recorder.clone());
        (session, recorder)
    }

    fn stored(snapshot: &Snapshot) -> MemoryStore {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new());
        adapter.save(snapshot).unwrap();
        adapter.store().clone()
    }

    fn snapshot_of(rows: Vec<Vec<u32>>, score: u64, best: u64) -> Snapshot {
        Snapshot {
            board: rows,
            score,
            merged_tiles: Vec::new(),
            best_score: best,
        }
    }

    fn stuck_board() -> Vec<Vec<u32>> {
        vec![
            vec![2, 4, 2, 4],
            vec![4, 2, 4, 2],
            vec![2, 4, 2, 4],
            vec![4, 2, 4, 2],
        ]
    }

    #[test]
    fn test_start_fresh_without_prompt() {
        let (mut s, rec) = session(MemoryStore::new());
        let mut answer = Answer(true, rec.clone());
        assert!(!s.start(&mut answer));
        assert_eq!(s.grid().tile_count(), 2);
        assert!(rec.log().prompts.is_empty());
        assert_eq!(rec.log().renders, 1);
    }

    #[test]
    fn test_start_restores_on_yes() {
        let saved = snapshot_of(
            vec![vec![2, 0, 0, 0], vec![0; 4], vec![0; 4], vec![0, 0, 0, 8]],
            16,
            40,
        );
        let (mut s, rec) = session(stored(&saved));
        let mut answer = Answer(true, rec.clone());
        assert!(s.start(&mut answer));
        assert_eq!(rec.log().prompts, vec![Prompt::RestoreProgress]);
        assert_eq!(s.grid().score(), 16);
        assert_eq!(s.grid().best_score(), 40);
        assert_eq!(s.grid().get_cell(3, 3), Ok(8));
    }

    #[test]
    fn test_start_resets_on_no() {
        let saved = snapshot_of(vec![vec![2, 0, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]], 8, 8);
        let (mut s, rec) = session(stored(&saved));
        let mut answer = Answer(false, rec.clone());
        assert!(!s.start(&mut answer));
        assert_eq!(s.grid().score(), 0);
        assert_eq!(s.grid().tile_count(), 2);
        // Declining drops the saved entry
        assert!(!s.persistence().has_saved());
    }

    #[test]
    fn test_start_with_invalid_save_falls_back() {
        let saved = snapshot_of(vec![vec![2, 0], vec![0, 2]], 0, 0);
        let (mut s, _) = session(stored(&saved));
        assert!(!s.start(&mut true));
        assert_eq!(s.grid().rows(), 4);
        assert_eq!(s.grid().tile_count(), 2);
    }

    #[test]
    fn test_move_saves_and_transitions() {
        let (mut s, rec) = session(MemoryStore::new());
        s.start(&mut true);

        // Some direction must change a two-tile 4x4 board
        let result = Direction::all()
            .map(|d| (d, s.move_tiles(d)))
            .find(|(_, r)| r.changed)
            .unwrap();
        assert_eq!(rec.log().transitions, vec![result.0]);
        assert_eq!(s.persistence().load().unwrap(), Some(s.export()));
    }

    #[test]
    fn test_unchanged_move_does_not_save() {
        let (mut s, rec) = session(MemoryStore::new());
        s.import(&snapshot_of(vec![vec![2, 0, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]], 0, 0))
            .unwrap();
        s.persistence_mut().clear().unwrap();

        let result = s.move_left();
        assert!(!result.changed);
        assert!(!s.persistence().has_saved());
        assert!(rec.log().transitions.is_empty());
    }

    #[test]
    fn test_game_over_notifies_without_mutation() {
        let (mut s, rec) = session(MemoryStore::new());
        s.import(&snapshot_of(stuck_board(), 100, 300)).unwrap();
        let before = s.export();

        let result = s.move_up();
        assert!(result.game_over);
        assert!(s.is_game_over());
        assert_eq!(s.export(), before);
        assert_eq!(
            rec.log().events,
            vec![GameEvent::GameOver {
                score: 100,
                best_score: 300
            }]
        );
    }

    #[test]
    fn test_reset_confirm() {
        let (mut s, rec) = session(MemoryStore::new());
        s.import(&snapshot_of(vec![vec![2, 2, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]], 20, 50))
            .unwrap();

        let mut no = Answer(false, rec.clone());
        assert!(!s.reset_confirm(&mut no));
        assert_eq!(s.grid().score(), 20);

        let mut yes = Answer(true, rec.clone());
        assert!(s.reset_confirm(&mut yes));
        assert_eq!(s.grid().score(), 0);
        assert_eq!(s.grid().best_score(), 50);
        assert_eq!(s.grid().tile_count(), 2);
        assert_eq!(rec.log().prompts, vec![Prompt::ResetGame, Prompt::ResetGame]);
    }

    #[test]
    fn test_offline_store_keeps_playing() {
        let (mut s, _) = session(MemoryStore::new());
        s.start(&mut true);
        s.persistence_mut().store_mut().set_offline(true);

        let changed = Direction::all().map(|d| s.move_tiles(d)).any(|r| r.changed);
        assert!(changed);
        assert!(s.grid().tile_count() >= 2);
        assert!(!s.load_game_state());
    }

    #[test]
    fn test_load_corrupt_keeps_state() {
        let mut store = MemoryStore::new();
        store.set(crate::STATE_KEY, "][").unwrap();
        let (mut s, _) = session(store);
        s.reset_game();
        let before = s.export();
        assert!(!s.load_game_state());
        assert_eq!(s.export(), before);
    }

    #[test]
    fn test_load_renders_on_every_outcome() {
        let mut store = MemoryStore::new();
        store.set(crate::STATE_KEY, "][").unwrap();
        let (mut s, rec) = session(store);

        // Corrupt record
        assert!(!s.load_game_state());
        assert_eq!(rec.log().renders, 1);

        // Nothing saved
        s.persistence_mut().clear().unwrap();
        assert!(!s.load_game_state());
        assert_eq!(rec.log().renders, 2);

        // Valid record
        let saved = snapshot_of(vec![vec![4, 0, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]], 4, 4);
        s.persistence_mut().save(&saved).unwrap();
        assert!(s.load_game_state());
        assert_eq!(rec.log().renders, 3);
    }

    #[test]
    fn test_swipe_moves() {
        let (mut s, _) = session(MemoryStore::new());
        s.import(&snapshot_of(vec![vec![0, 0, 0, 2], vec![0; 4], vec![0; 4], vec![0; 4]], 0, 0))
            .unwrap();
        let (direction, result) = s.swipe(Gesture::new((200.0, 50.0), (20.0, 60.0)));
        assert_eq!(direction, Direction::Left);
        assert!(result.changed);
        assert_eq!(s.grid().get_cell(0, 0), Ok(2));
    }

    #[test]
    fn test_prompt_messages() {
        assert_eq!(Prompt::ResetGame.message(), "Do you want to reset your game?");
        assert_eq!(
            Prompt::RestoreProgress.message(),
            "Do you want to restore your progress?"
        );
    }
}
