//! Runs leaderboard work away from the UI.
//!
//! Jobs are handled one at a time in the order they were submitted, so a
//! save and its prune can never interleave with another job.

use std::collections::VecDeque;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc::{self, Receiver, Sender};
#[cfg(not(target_arch = "wasm32"))]
use std::thread::JoinHandle;

use crate::ranking::{BestTimes, MAX_RESULTS};
use crate::record::GameRecord;
use crate::store::RecordStore;

#[derive(Clone, Debug, PartialEq)]
pub enum RecordJob {
    /// A game was won; check the record flag, then save and prune.
    Complete { size: usize, time: f64 },
    LoadBest { size: usize },
    LoadResults { size: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecordReply {
    Completed {
        size: usize,
        time: f64,
        is_new_record: bool,
    },
    BestTime {
        size: usize,
        time: Option<f64>,
    },
    Results {
        size: usize,
        records: Vec<GameRecord>,
    },
}

impl RecordReply {
    pub fn size(&self) -> usize {
        match *self {
            Self::Completed { size, .. }
            | Self::BestTime { size, .. }
            | Self::Results { size, .. } => size,
        }
    }

    /// Whether a host showing a `size` board should apply this reply.
    /// A completion only counts while that board is still won; any other
    /// time it belongs to a game that has since been reset.
    pub fn applies_to(&self, size: Option<usize>, won: bool) -> bool {
        if size != Some(self.size()) {
            return false;
        }
        !matches!(self, Self::Completed { .. }) || won
    }
}

type Ranking = BestTimes<Box<dyn RecordStore>>;

fn run_job(ranking: &mut Ranking, job: RecordJob) -> RecordReply {
    match job {
        RecordJob::Complete { size, time } => {
            let is_new_record = ranking.is_new_record(time, size);
            ranking.record(size, time);
            log::debug!("stored {}x{} result {:.2}s (new record: {})", size, size, time, is_new_record);
            RecordReply::Completed {
                size,
                time,
                is_new_record,
            }
        }
        RecordJob::LoadBest { size } => RecordReply::BestTime {
            size,
            time: ranking.best_time(size),
        },
        RecordJob::LoadResults { size } => RecordReply::Results {
            size,
            records: ranking.top_results(size, MAX_RESULTS),
        },
    }
}

enum Backend {
    #[cfg(not(target_arch = "wasm32"))]
    Thread {
        jobs: Option<Sender<RecordJob>>,
        replies: Receiver<RecordReply>,
        handle: Option<JoinHandle<()>>,
    },
    Inline {
        ranking: Ranking,
        pending: VecDeque<RecordReply>,
    },
}

pub struct RecordWorker {
    backend: Backend,
}

impl RecordWorker {
    /// Moves `store` onto a background thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn(store: Box<dyn RecordStore>) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<RecordJob>();
        let (reply_tx, reply_rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("record-worker".into())
            .spawn(move || {
                let mut ranking = BestTimes::new(store);
                for job in job_rx {
                    if reply_tx.send(run_job(&mut ranking, job)).is_err() {
                        break;
                    }
                }
                log::debug!("record worker stopped");
            })?;
        Ok(Self {
            backend: Backend::Thread {
                jobs: Some(job_tx),
                replies: reply_rx,
                handle: Some(handle),
            },
        })
    }

    /// Handles every job immediately on the caller's thread.
    pub fn inline(store: Box<dyn RecordStore>) -> Self {
        Self {
            backend: Backend::Inline {
                ranking: BestTimes::new(store),
                pending: VecDeque::new(),
            },
        }
    }

    pub fn submit(&mut self, job: RecordJob) {
        match &mut self.backend {
            #[cfg(not(target_arch = "wasm32"))]
            Backend::Thread { jobs, .. } => {
                let sent = jobs.as_ref().map(|tx| tx.send(job).is_ok());
                if sent != Some(true) {
                    log::warn!("record worker is gone; dropping job");
                }
            }
            Backend::Inline { ranking, pending } => {
                pending.push_back(run_job(ranking, job));
            }
        }
    }

    /// Replies that are ready now. Never blocks.
    pub fn poll(&mut self) -> Vec<RecordReply> {
        match &mut self.backend {
            #[cfg(not(target_arch = "wasm32"))]
            Backend::Thread { replies, .. } => replies.try_iter().collect(),
            Backend::Inline { pending, .. } => pending.drain(..).collect(),
        }
    }

    /// Every stored record, when the store lives on this thread.
    pub fn snapshot(&self) -> Option<Vec<GameRecord>> {
        match &self.backend {
            #[cfg(not(target_arch = "wasm32"))]
            Backend::Thread { .. } => None,
            Backend::Inline { ranking, .. } => ranking.store().all_records().ok(),
        }
    }

    /// Waits for outstanding jobs and returns their replies.
    pub fn shutdown(mut self) -> Vec<RecordReply> {
        self.stop();
        self.poll()
    }

    fn stop(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        if let Backend::Thread { jobs, handle, .. } = &mut self.backend {
            jobs.take();
            if let Some(handle) = handle.take() {
                if handle.join().is_err() {
                    log::error!("record worker panicked");
                }
            }
        }
    }
}

impl Drop for RecordWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
