//! File-backed store
//!
//! Each mutation is applied to a copy of the state, the copy is written as a
//! new snapshot, and only then swapped in. Readers see either the old state
//! or the new one, never a write that did not reach the disk.

use std::path::PathBuf;
use std::sync::RwLock;

use auction_engine::{Store, StoreState};
use chrono::Utc;
use tracing::{debug, info};
use types::bid::Bid;
use types::errors::StoreError;
use types::ids::JobId;
use types::job::Job;

use crate::snapshot::{load_snapshot, Snapshot, SnapshotWriter};

/// Configuration for the file store.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Snapshot file location.
    pub path: PathBuf,
    /// zstd-compress the snapshot.
    pub compress: bool,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.snap"),
            compress: false,
        }
    }
}

/// Durable store
pub struct FileStore {
    writer: SnapshotWriter,
    state: RwLock<StoreState>,
}

impl FileStore {
    /// Open the store, loading the existing snapshot if there is one.
    pub fn open(config: FileStoreConfig) -> Result<Self, StoreError> {
        let state = match load_snapshot(&config.path)? {
            Some(snapshot) => {
                info!(
                    path = %config.path.display(),
                    jobs = snapshot.state.jobs.len(),
                    bids = snapshot.state.bids.len(),
                    taken_at = %snapshot.taken_at,
                    "Loaded snapshot"
                );
                snapshot.state
            }
            None => {
                info!(path = %config.path.display(), "No snapshot found, starting empty");
                StoreState::empty()
            }
        };

        Ok(Self {
            writer: SnapshotWriter::new(config.path, config.compress),
            state: RwLock::new(state),
        })
    }

    /// Apply `change` to a copy of the state and persist it.
    fn mutate<F>(&self, change: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoreState) -> Result<(), StoreError>,
    {
        let mut current = self.state.write().map_err(|_| poisoned())?;

        let mut next = current.clone();
        change(&mut next)?;

        let snapshot = Snapshot::new(Utc::now(), next)?;
        self.writer.write(&snapshot)?;
        debug!(
            path = %self.writer.path().display(),
            jobs = snapshot.state.jobs.len(),
            bids = snapshot.state.bids.len(),
            "Snapshot written"
        );

        *current = snapshot.state;
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

impl Store for FileStore {
    fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.state.read().map_err(|_| poisoned())?.jobs.clone())
    }

    fn bids(&self) -> Result<Vec<Bid>, StoreError> {
        Ok(self.state.read().map_err(|_| poisoned())?.bids.clone())
    }

    fn insert_job(&self, job: Job) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.insert_job(job);
            Ok(())
        })
    }

    fn insert_bid(&self, bid: Bid) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.insert_bid(bid);
            Ok(())
        })
    }

    fn update_jobs(&self, jobs: &[Job]) -> Result<(), StoreError> {
        if jobs.is_empty() {
            return Ok(());
        }
        self.mutate(|state| state.update_jobs(jobs))
    }

    fn job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.jobs.iter().find(|job| job.id == *id).cloned())
    }

    fn bids_for_job(&self, id: &JobId) -> Result<Vec<Bid>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .bids
            .iter()
            .filter(|bid| bid.job_id == *id)
            .cloned()
            .collect())
    }
}
