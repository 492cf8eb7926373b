//! Persistent storage for finished games.
//!
//! The store knows nothing about rankings: it saves, lists by size in
//! ascending time order, and drops everything past a cutoff.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::record::GameRecord;

pub trait RecordStore: Send {
    fn save_record(&mut self, size: usize, time: f64) -> StoreResult<()>;

    /// Records for `size`, fastest first, at most `limit` of them.
    fn fetch_records(&self, size: usize, limit: usize) -> StoreResult<Vec<GameRecord>>;

    /// Keeps the `keep` fastest records for `size` and deletes the rest.
    fn delete_old_records(&mut self, size: usize, keep: usize) -> StoreResult<()>;

    /// Every record of every size, in storage order.
    fn all_records(&self) -> StoreResult<Vec<GameRecord>>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn save_record(&mut self, size: usize, time: f64) -> StoreResult<()> {
        (**self).save_record(size, time)
    }

    fn fetch_records(&self, size: usize, limit: usize) -> StoreResult<Vec<GameRecord>> {
        (**self).fetch_records(size, limit)
    }

    fn delete_old_records(&mut self, size: usize, keep: usize) -> StoreResult<()> {
        (**self).delete_old_records(size, keep)
    }

    fn all_records(&self) -> StoreResult<Vec<GameRecord>> {
        (**self).all_records()
    }
}

/// Records held in memory. Serializable so a host can stash it elsewhere.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    records: Vec<GameRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<GameRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn sorted_for(&self, size: usize) -> Vec<&GameRecord> {
        let mut matching: Vec<&GameRecord> =
            self.records.iter().filter(|r| r.size == size).collect();
        matching.sort_by(|a, b| a.time.total_cmp(&b.time));
        matching
    }
}

impl RecordStore for MemoryStore {
    fn save_record(&mut self, size: usize, time: f64) -> StoreResult<()> {
        self.records.push(GameRecord::new(size, time));
        Ok(())
    }

    fn fetch_records(&self, size: usize, limit: usize) -> StoreResult<Vec<GameRecord>> {
        Ok(self
            .sorted_for(size)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    fn delete_old_records(&mut self, size: usize, keep: usize) -> StoreResult<()> {
        let doomed: Vec<u64> = self
            .sorted_for(size)
            .into_iter()
            .skip(keep)
            .map(|r| r.id)
            .collect();
        if !doomed.is_empty() {
            self.records
                .retain(|r| r.size != size || !doomed.contains(&r.id));
        }
        Ok(())
    }

    fn all_records(&self) -> StoreResult<Vec<GameRecord>> {
        Ok(self.records.clone())
    }
}

/// Records kept in a JSON array on disk. Every change rewrites the file, and
/// a change whose write fails is undone in memory so memory matches the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Opens `path`. A missing file is an empty store; an unreadable one is
    /// logged and also treated as empty so the game stays playable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let inner = match Self::load(&path) {
            Ok(records) => {
                log::info!("loaded {} records from {}", records.len(), path.display());
                MemoryStore::from_records(records)
            }
            Err(e) => {
                log::warn!("could not read records from {}: {}", path.display(), e);
                MemoryStore::new()
            }
        };
        Self { path, inner }
    }

    fn load(path: &Path) -> StoreResult<Vec<GameRecord>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&self) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self.inner.records())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    fn save_record(&mut self, size: usize, time: f64) -> StoreResult<()> {
        let before = self.inner.len();
        self.inner.save_record(size, time)?;
        if let Err(e) = self.flush() {
            self.inner.records.truncate(before);
            return Err(e);
        }
        Ok(())
    }

    fn fetch_records(&self, size: usize, limit: usize) -> StoreResult<Vec<GameRecord>> {
        self.inner.fetch_records(size, limit)
    }

    fn delete_old_records(&mut self, size: usize, keep: usize) -> StoreResult<()> {
        let before = self.inner.records.clone();
        self.inner.delete_old_records(size, keep)?;
        if self.inner.len() != before.len() {
            if let Err(e) = self.flush() {
                self.inner.records = before;
                return Err(e);
            }
        }
        Ok(())
    }

    fn all_records(&self) -> StoreResult<Vec<GameRecord>> {
        self.inner.all_records()
    }
}
