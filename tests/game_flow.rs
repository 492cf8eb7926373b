use std::collections::BTreeSet;
use std::time::Duration;

use nqueens_puzzle::board::find_conflicts;
use nqueens_puzzle::clock::ManualClock;
use nqueens_puzzle::cue::{Cue, CuePlayer, LogCuePlayer};
use nqueens_puzzle::{BoardSize, GameCommand, GameController, Position};
use pretty_assertions::assert_eq;

fn game(n: usize) -> (GameController, ManualClock) {
    let clock = ManualClock::new();
    let mut game = GameController::new(Box::new(clock.clone()));
    game.start(BoardSize::new(n).unwrap());
    game.take_commands();
    (game, clock)
}

fn place(game: &mut GameController, points: &[(usize, usize)]) {
    for &(r, c) in points {
        assert!(game.place_or_remove(r, c), "({r}, {c}) was rejected");
    }
}

fn conflict_cells(game: &GameController) -> BTreeSet<Position> {
    game.cells()
        .iter()
        .filter(|c| c.is_conflict)
        .map(|c| c.position())
        .collect()
}

const EIGHT_QUEENS: [(usize, usize); 8] =
    [(0, 0), (1, 4), (2, 7), (3, 5), (4, 2), (5, 6), (6, 1), (7, 3)];

#[test]
fn four_queens_solution_wins() {
    let (mut game, _) = game(4);
    place(&mut game, &[(0, 1), (1, 3), (2, 0), (3, 2)]);
    assert!(game.is_won());
    assert!(game.conflicts().is_empty());
    assert!(!game.allow_playing());
}

#[test]
fn eight_queens_solution_wins() {
    let (mut game, _) = game(8);
    place(&mut game, &EIGHT_QUEENS);
    assert!(game.is_won());
    let commands = game.take_commands();
    let recorded: Vec<_> = commands
        .iter()
        .filter(|c| matches!(c, GameCommand::RecordResult { .. }))
        .collect();
    assert_eq!(recorded.len(), 1);
}

#[test]
fn seven_of_eight_is_not_a_win() {
    let (mut game, _) = game(8);
    place(&mut game, &EIGHT_QUEENS[..7]);
    assert!(!game.is_won());
    assert!(game.allow_playing());
    assert!(game.is_running());
}

#[test]
fn full_but_conflicting_board_is_not_a_win() {
    let (mut game, _) = game(8);
    let diagonal: Vec<(usize, usize)> = (0..8).map(|i| (i, i)).collect();
    place(&mut game, &diagonal);
    assert_eq!(game.queens_count(), 8);
    assert_eq!(game.conflicts().len(), 8);
    assert!(!game.is_won());
    assert!(game.allow_playing());
}

#[test]
fn same_row_pair_conflicts() {
    let (mut game, _) = game(8);
    place(&mut game, &[(0, 0), (0, 7)]);
    let expected: BTreeSet<Position> = [Position::new(0, 0), Position::new(0, 7)].into();
    assert_eq!(conflict_cells(&game), expected);
}

#[test]
fn column_and_both_diagonals_conflict() {
    for pair in [[(1, 5), (6, 5)], [(1, 2), (4, 5)], [(1, 5), (5, 1)]] {
        let (mut game, _) = game(8);
        place(&mut game, &pair);
        assert_eq!(conflict_cells(&game).len(), 2, "pair {pair:?}");
    }
}

#[test]
fn safe_queens_are_never_marked() {
    let (mut game, _) = game(8);
    place(&mut game, &[(0, 3), (1, 6), (2, 4)]);
    assert!(conflict_cells(&game).is_empty());
}

#[test]
fn conflict_set_matches_a_fresh_scan_after_every_move() {
    let (mut game, _) = game(6);
    let moves = [(2, 1), (2, 4), (0, 0), (5, 5), (2, 4), (3, 3), (0, 0), (4, 1)];
    for (r, c) in moves {
        game.place_or_remove(r, c);
        assert_eq!(game.conflicts(), &find_conflicts(game.queens()));
        assert_eq!(&conflict_cells(&game), game.conflicts());
    }
}

#[test]
fn place_then_remove_restores_previous_state() {
    let (mut game, _) = game(7);
    place(&mut game, &[(0, 0), (3, 3)]);
    let queens_before = game.queens().clone();
    let conflicts_before = game.conflicts().clone();

    for (r, c) in [(0, 6), (3, 4), (6, 2)] {
        game.place_or_remove(r, c);
        game.place_or_remove(r, c);
        assert_eq!(game.queens(), &queens_before);
        assert_eq!(game.conflicts(), &conflicts_before);
    }
}

#[test]
fn removing_a_queen_before_the_last_move_needs_a_full_board_again() {
    let (mut game, _) = game(4);
    place(&mut game, &[(0, 1), (1, 3), (2, 0)]);
    game.place_or_remove(2, 0);
    game.place_or_remove(3, 2);
    assert!(!game.is_won());
    game.place_or_remove(2, 0);
    assert!(game.is_won());
}

#[test]
fn winning_time_is_wall_clock_from_start() {
    let (mut game, clock) = game(4);
    // One tick in 2.75s; the result still comes from the clock.
    clock.advance(Duration::from_millis(730));
    game.tick();
    place(&mut game, &[(0, 1), (1, 3)]);
    clock.advance(Duration::from_millis(2_020));
    place(&mut game, &[(2, 0), (3, 2)]);

    let time = game.take_commands().into_iter().find_map(|c| match c {
        GameCommand::RecordResult { time, .. } => Some(time),
        _ => None,
    });
    assert_eq!(time, Some(2.75));
}

#[test]
fn elapsed_never_goes_backwards_while_running() {
    let (mut game, clock) = game(5);
    let mut last = Duration::ZERO;
    for step in [100, 0, 250, 100, 0] {
        clock.advance(Duration::from_millis(step));
        game.tick();
        assert!(game.elapsed() >= last);
        last = game.elapsed();
    }
}

#[test]
fn restart_with_new_size_clears_everything() {
    let (mut game, _) = game(4);
    place(&mut game, &[(0, 0)]);
    game.start_from_input("5").unwrap();
    assert_eq!(game.size().map(BoardSize::get), Some(5));
    assert_eq!(game.queens_count(), 0);
    assert_eq!(game.cells().len(), 25);
}

#[test]
fn commands_feed_cue_player() {
    let (mut game, _) = game(4);
    let mut cues = LogCuePlayer::default();
    place(&mut game, &[(0, 1), (1, 3), (2, 0), (3, 2)]);
    let mut victory = false;
    for command in game.take_commands() {
        if let GameCommand::PlayCue(cue) = command {
            victory |= cue == Cue::Victory;
            cues.play(cue);
        }
    }
    assert!(victory);
    assert_eq!(cues.played(), 5);
}
