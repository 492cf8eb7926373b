use crate::record::GameRecord;
use crate::store::RecordStore;

/// Results kept per board size.
pub const MAX_RESULTS: usize = 10;

/// Best-times leaderboard on top of a [`RecordStore`].
///
/// Store failures are logged and swallowed: a failed write is dropped and a
/// failed read looks like an empty leaderboard.
pub struct BestTimes<S> {
    store: S,
}

impl<S: RecordStore> BestTimes<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Saves a finished game, then prunes the size back to [`MAX_RESULTS`].
    /// The prune runs even when the save fails.
    pub fn record(&mut self, size: usize, time: f64) {
        if let Err(e) = self.store.save_record(size, time) {
            log::warn!("failed to save {}x{} result: {}", size, size, e);
        }
        if let Err(e) = self.store.delete_old_records(size, MAX_RESULTS) {
            log::warn!("failed to prune {}x{} results: {}", size, size, e);
        }
    }

    pub fn best_time(&self, size: usize) -> Option<f64> {
        self.fetch(size, 1).first().map(|r| r.time)
    }

    /// True when nothing is recorded for `size` yet or `time` beats the best.
    /// Matching the best time is not a new record.
    pub fn is_new_record(&self, time: f64, size: usize) -> bool {
        match self.best_time(size) {
            Some(best) => time < best,
            None => true,
        }
    }

    /// Fastest results first, capped at `limit`.
    pub fn top_results(&self, size: usize, limit: usize) -> Vec<GameRecord> {
        self.fetch(size, limit.min(MAX_RESULTS))
    }

    fn fetch(&self, size: usize, limit: usize) -> Vec<GameRecord> {
        self.store.fetch_records(size, limit).unwrap_or_else(|e| {
            log::warn!("failed to load {}x{} results: {}", size, size, e);
            Vec::new()
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
