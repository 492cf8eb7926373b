use nqueens_puzzle::clock::ManualClock;
use nqueens_puzzle::ranking::MAX_RESULTS;
use nqueens_puzzle::store::{JsonFileStore, MemoryStore, RecordStore};
use nqueens_puzzle::worker::{RecordJob, RecordReply, RecordWorker};
use nqueens_puzzle::{BestTimes, BoardSize, GameCommand, GameController};
use pretty_assertions::assert_eq;
use std::time::Duration;

/// Plays one 4×4 game and forwards its commands to the worker.
fn win_in(worker: &mut RecordWorker, millis: u64) {
    let clock = ManualClock::new();
    let mut game = GameController::new(Box::new(clock.clone()));
    game.start(BoardSize::new(4).unwrap());
    clock.advance(Duration::from_millis(millis));
    for (r, c) in [(0, 1), (1, 3), (2, 0), (3, 2)] {
        game.place_or_remove(r, c);
    }
    for command in game.take_commands() {
        match command {
            GameCommand::RecordResult { size, time } => {
                worker.submit(RecordJob::Complete { size: size.get(), time })
            }
            GameCommand::LoadBestTime { size } => {
                worker.submit(RecordJob::LoadBest { size: size.get() })
            }
            GameCommand::PlayCue(_) => {}
        }
    }
}

#[test]
fn won_games_flow_into_the_leaderboard() {
    let mut worker = RecordWorker::inline(Box::new(MemoryStore::new()));
    win_in(&mut worker, 5_000);
    win_in(&mut worker, 5_000);
    win_in(&mut worker, 4_500);

    let flags: Vec<bool> = worker
        .poll()
        .into_iter()
        .filter_map(|r| match r {
            RecordReply::Completed { is_new_record, .. } => Some(is_new_record),
            _ => None,
        })
        .collect();
    // A tie with the best time is not a new record.
    assert_eq!(flags, vec![true, false, true]);

    worker.submit(RecordJob::LoadBest { size: 4 });
    assert_eq!(
        worker.poll(),
        vec![RecordReply::BestTime { size: 4, time: Some(4.5) }]
    );
}

#[test]
fn many_inserts_keep_ten_lowest_times() {
    let mut ranking = BestTimes::new(MemoryStore::new());
    let times = [9.0, 3.0, 15.0, 1.0, 12.0, 7.0, 2.0, 20.0, 5.0, 11.0, 4.0, 8.0, 6.0, 30.0];
    for t in times {
        ranking.record(10, t);
        assert!(ranking.top_results(10, MAX_RESULTS).len() <= MAX_RESULTS);
    }
    let mut expected = times.to_vec();
    expected.sort_by(f64::total_cmp);
    expected.truncate(MAX_RESULTS);
    let kept: Vec<f64> = ranking.top_results(10, MAX_RESULTS).iter().map(|r| r.time).collect();
    assert_eq!(kept, expected);
    assert_eq!(ranking.best_time(10), Some(1.0));
}

#[test]
fn file_backed_leaderboard_persists_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("records.json");

    let mut worker = RecordWorker::spawn(Box::new(JsonFileStore::open(&path))).unwrap();
    for i in 0..12 {
        worker.submit(RecordJob::Complete { size: 8, time: 40.0 + i as f64 });
    }
    worker.shutdown();

    let store = JsonFileStore::open(&path);
    let all = store.all_records().unwrap();
    assert_eq!(all.len(), MAX_RESULTS);
    let ranking = BestTimes::new(store);
    assert_eq!(ranking.best_time(8), Some(40.0));
    assert!(!ranking.is_new_record(40.0, 8));
    assert!(ranking.is_new_record(39.5, 8));
}
