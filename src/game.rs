use std::collections::BTreeSet;
use std::time::Duration;

use crate::board::{build_cells, find_conflicts, BoardSize, CellData, Position};
use crate::clock::{Clock, Instant, SystemClock};
use crate::cue::Cue;
use crate::error::PuzzleError;

/// How often the host should call [`GameController::tick`] while a game runs.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Side effects requested by the controller. The host executes them; none of
/// them block gameplay.
#[derive(Clone, Debug, PartialEq)]
pub enum GameCommand {
    PlayCue(Cue),
    /// A board was solved in `time` seconds.
    RecordResult { size: BoardSize, time: f64 },
    LoadBestTime { size: BoardSize },
}

#[derive(Clone, Copy, Debug)]
enum Timer {
    Stopped,
    Running { started: Instant },
}

/// Owns the board state for a single player.
pub struct GameController {
    clock: Box<dyn Clock>,
    size: Option<BoardSize>,
    queens: BTreeSet<Position>,
    conflicts: BTreeSet<Position>,
    cells: Vec<CellData>,
    timer: Timer,
    elapsed: Duration,
    allow_playing: bool,
    won: bool,
    commands: Vec<GameCommand>,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl GameController {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            size: None,
            queens: BTreeSet::new(),
            conflicts: BTreeSet::new(),
            cells: Vec::new(),
            timer: Timer::Stopped,
            elapsed: Duration::ZERO,
            allow_playing: false,
            won: false,
            commands: Vec::new(),
        }
    }

    /// Begins a fresh game on a board of `size`.
    pub fn start(&mut self, size: BoardSize) {
        log::info!("starting {}x{} game", size, size);
        self.size = Some(size);
        self.reset();
    }

    /// Parses player input and starts a game. Invalid input changes nothing.
    pub fn start_from_input(&mut self, input: &str) -> Result<BoardSize, PuzzleError> {
        let size = BoardSize::parse(input)?;
        self.start(size);
        Ok(size)
    }

    /// Clears the board, keeps the size and restarts the timer.
    pub fn reset(&mut self) {
        let Some(size) = self.size else {
            return;
        };
        self.queens.clear();
        self.conflicts.clear();
        self.won = false;
        self.allow_playing = true;
        self.elapsed = Duration::ZERO;
        self.timer = Timer::Running {
            started: self.clock.now(),
        };
        self.rebuild_cells();
        self.commands.push(GameCommand::LoadBestTime { size });
    }

    /// Toggles a queen on `(row, col)`.
    ///
    /// Ignored before the first game, after a win and for squares off the board.
    /// Returns true when the board changed.
    pub fn place_or_remove(&mut self, row: usize, col: usize) -> bool {
        let Some(size) = self.size else {
            return false;
        };
        let pos = Position::new(row, col);
        if !self.allow_playing || !size.contains(pos) {
            return false;
        }

        if !self.queens.remove(&pos) {
            self.queens.insert(pos);
            self.commands.push(GameCommand::PlayCue(Cue::Move));
        }

        self.conflicts = find_conflicts(&self.queens);
        self.rebuild_cells();
        self.check_win(size);
        true
    }

    /// Refreshes the elapsed time from the clock.
    pub fn tick(&mut self) {
        if let Timer::Running { started } = self.timer {
            let now = self.clock.now().saturating_duration_since(started);
            self.elapsed = self.elapsed.max(now);
        }
    }

    fn check_win(&mut self, size: BoardSize) {
        if self.queens.len() != size.get() || !self.conflicts.is_empty() {
            return;
        }
        self.tick();
        self.timer = Timer::Stopped;
        self.allow_playing = false;
        self.won = true;

        let time = self.elapsed.as_secs_f64();
        log::info!("solved {}x{} in {:.2}s", size, size, time);
        self.commands.push(GameCommand::PlayCue(Cue::Victory));
        self.commands.push(GameCommand::RecordResult { size, time });
        self.commands.push(GameCommand::LoadBestTime { size });
    }

    fn rebuild_cells(&mut self) {
        let n = self.size.map_or(0, BoardSize::get);
        self.cells = build_cells(n, &self.queens, &self.conflicts);
    }

    /// Drains the side effects queued since the last call.
    pub fn take_commands(&mut self) -> Vec<GameCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn size(&self) -> Option<BoardSize> {
        self.size
    }

    pub fn has_game(&self) -> bool {
        self.size.is_some()
    }

    pub fn queens(&self) -> &BTreeSet<Position> {
        &self.queens
    }

    pub fn queens_count(&self) -> usize {
        self.queens.len()
    }

    pub fn conflicts(&self) -> &BTreeSet<Position> {
        &self.conflicts
    }

    pub fn cells(&self) -> &[CellData] {
        &self.cells
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        matches!(self.timer, Timer::Running { .. })
    }

    pub fn allow_playing(&self) -> bool {
        self.allow_playing
    }

    pub fn is_won(&self) -> bool {
        self.won
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;

    fn controller() -> (GameController, ManualClock) {
        let clock = ManualClock::new();
        (GameController::new(Box::new(clock.clone())), clock)
    }

    fn size(n: usize) -> BoardSize {
        BoardSize::new(n).unwrap()
    }

    #[test]
    fn nothing_happens_before_start() {
        let (mut game, _) = controller();
        assert!(!game.place_or_remove(0, 0));
        assert!(!game.has_game());
        assert!(game.cells().is_empty());
        assert!(game.take_commands().is_empty());
    }

    #[test]
    fn start_builds_board_and_requests_best_time() {
        let (mut game, _) = controller();
        game.start(size(8));
        assert_eq!(game.cells().len(), 64);
        assert!(game.is_running());
        assert!(game.allow_playing());
        assert_eq!(
            game.take_commands(),
            vec![GameCommand::LoadBestTime { size: size(8) }]
        );
    }

    #[test]
    fn invalid_input_keeps_previous_game() {
        let (mut game, _) = controller();
        game.start(size(6));
        game.place_or_remove(0, 0);
        assert!(game.start_from_input("abc").is_err());
        assert!(game.start_from_input("13").is_err());
        assert_eq!(game.size(), Some(size(6)));
        assert_eq!(game.queens_count(), 1);
    }

    #[test]
    fn placing_emits_move_cue_but_removing_does_not() {
        let (mut game, _) = controller();
        game.start(size(6));
        game.take_commands();
        game.place_or_remove(3, 5);
        assert_eq!(game.take_commands(), vec![GameCommand::PlayCue(Cue::Move)]);
        game.place_or_remove(3, 5);
        assert!(game.take_commands().is_empty());
    }

    #[test]
    fn off_board_square_is_ignored() {
        let (mut game, _) = controller();
        game.start(size(4));
        assert!(!game.place_or_remove(4, 0));
        assert!(!game.place_or_remove(0, 9));
        assert_eq!(game.queens_count(), 0);
    }

    #[test]
    fn elapsed_follows_the_clock() {
        let (mut game, clock) = controller();
        game.start(size(5));
        clock.advance(Duration::from_millis(250));
        game.tick();
        assert_eq!(game.elapsed(), Duration::from_millis(250));
        clock.advance(Duration::from_millis(1_000));
        game.tick();
        assert_eq!(game.elapsed(), Duration::from_millis(1_250));
    }

    #[test]
    fn win_stops_timer_and_reports_time() {
        let (mut game, clock) = controller();
        game.start(size(4));
        game.take_commands();
        for (r, c) in [(0, 1), (1, 3), (2, 0)] {
            game.place_or_remove(r, c);
        }
        clock.advance(Duration::from_millis(1_500));
        game.place_or_remove(3, 2);

        assert!(game.is_won());
        assert!(!game.is_running());
        assert!(!game.allow_playing());
        let commands = game.take_commands();
        assert!(commands.contains(&GameCommand::PlayCue(Cue::Victory)));
        assert!(commands.contains(&GameCommand::RecordResult {
            size: size(4),
            time: 1.5
        }));
        assert_eq!(
            commands.last(),
            Some(&GameCommand::LoadBestTime { size: size(4) })
        );

        clock.advance(Duration::from_secs(10));
        game.tick();
        assert_eq!(game.elapsed(), Duration::from_millis(1_500));
        assert!(!game.place_or_remove(0, 0));
    }

    #[test]
    fn reset_keeps_size_and_reopens_board() {
        let (mut game, clock) = controller();
        game.start(size(4));
        for (r, c) in [(0, 1), (1, 3), (2, 0), (3, 2)] {
            game.place_or_remove(r, c);
        }
        clock.advance(Duration::from_secs(3));
        game.reset();
        assert_eq!(game.size(), Some(size(4)));
        assert_eq!(game.queens_count(), 0);
        assert!(!game.is_won());
        assert!(game.allow_playing());
        assert!(game.is_running());
        assert_eq!(game.elapsed(), Duration::ZERO);
        assert!(game.cells().iter().all(|c| !c.has_queen && !c.is_conflict));
    }
}
