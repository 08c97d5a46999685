//! Store abstraction over the Jobs and Bids collections
//!
//! The engine never holds global state: every read and write goes through a
//! `Store`. Each write method must succeed or fail as a unit. Per-job
//! linearization is the engine's job, not the store's.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use types::bid::Bid;
use types::errors::StoreError;
use types::ids::JobId;
use types::job::Job;

/// Persistent key-space holding jobs and bids
pub trait Store: Send + Sync {
    /// All jobs in creation order
    fn jobs(&self) -> Result<Vec<Job>, StoreError>;

    /// All bids in admission order
    fn bids(&self) -> Result<Vec<Bid>, StoreError>;

    fn insert_job(&self, job: Job) -> Result<(), StoreError>;

    fn insert_bid(&self, bid: Bid) -> Result<(), StoreError>;

    /// Replace the stored copies of `jobs` in one atomic write
    fn update_jobs(&self, jobs: &[Job]) -> Result<(), StoreError>;

    fn job(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs()?.into_iter().find(|job| job.id == *id))
    }

    /// Bids for one job in admission order
    fn bids_for_job(&self, id: &JobId) -> Result<Vec<Bid>, StoreError> {
        Ok(self
            .bids()?
            .into_iter()
            .filter(|bid| bid.job_id == *id)
            .collect())
    }
}

/// The whole key-space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub jobs: Vec<Job>,
    pub bids: Vec<Bid>,
}

impl StoreState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert_job(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn insert_bid(&mut self, bid: Bid) {
        self.bids.push(bid);
    }

    /// Replace stored jobs by id. Fails without touching anything if one of
    /// them is unknown.
    pub fn update_jobs(&mut self, jobs: &[Job]) -> Result<(), StoreError> {
        let mut positions = Vec::with_capacity(jobs.len());
        for job in jobs {
            let pos = self
                .jobs
                .iter()
                .position(|stored| stored.id == job.id)
                .ok_or_else(|| StoreError::UnknownRecord {
                    id: job.id.to_string(),
                })?;
            positions.push(pos);
        }
        for (pos, job) in positions.into_iter().zip(jobs) {
            self.jobs[pos] = job.clone();
        }
        Ok(())
    }
}

/// In-memory store
///
/// Used by tests and by deployments that do not need durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_string())
}

impl Store for MemoryStore {
    fn jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.state.read().map_err(|_| poisoned())?.jobs.clone())
    }

    fn bids(&self) -> Result<Vec<Bid>, StoreError> {
        Ok(self.state.read().map_err(|_| poisoned())?.bids.clone())
    }

    fn insert_job(&self, job: Job) -> Result<(), StoreError> {
        self.state.write().map_err(|_| poisoned())?.insert_job(job);
        Ok(())
    }

    fn insert_bid(&self, bid: Bid) -> Result<(), StoreError> {
        self.state.write().map_err(|_| poisoned())?.insert_bid(bid);
        Ok(())
    }

    fn update_jobs(&self, jobs: &[Job]) -> Result<(), StoreError> {
        self.state.write().map_err(|_| poisoned())?.update_jobs(jobs)
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


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use types::job::JobStatus;

    fn make_job() -> Job {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        Job {
            id: JobId::new(),
            title: "Move boxes".to_string(),
            description: "Ten boxes".to_string(),
            requirements: "Van".to_string(),
            poster_name: "Kim".to_string(),
            poster_contact: "kim@example.com".to_string(),
            published_at: now,
            expires_at: now + Duration::hours(1),
            status: JobStatus::Open,
            winner_bid_id: None,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        let job = make_job();
        store.insert_job(job.clone()).unwrap();

        assert_eq!(store.job(&job.id).unwrap(), Some(job.clone()));
        assert_eq!(store.job(&JobId::new()).unwrap(), None);
        assert_eq!(store.jobs().unwrap().len(), 1);
    }

    #[test]
    fn test_bids_for_job_keeps_admission_order() {
        let store = MemoryStore::new();
        let job = make_job();
        let other = make_job();
        let ts = job.published_at;

        store.insert_bid(Bid::new(job.id, Decimal::from(100), ts)).unwrap();
        store.insert_bid(Bid::new(other.id, Decimal::from(5), ts)).unwrap();
        store.insert_bid(Bid::new(job.id, Decimal::from(90), ts)).unwrap();

        let amounts: Vec<Decimal> = store
            .bids_for_job(&job.id)
            .unwrap()
            .into_iter()
            .map(|b| b.amount)
            .collect();
        assert_eq!(amounts, vec![Decimal::from(100), Decimal::from(90)]);
    }

    #[test]
    fn test_update_jobs_replaces_by_id() {
        let store = MemoryStore::new();
        let mut job = make_job();
        store.insert_job(job.clone()).unwrap();

        job.close(None);
        store.update_jobs(std::slice::from_ref(&job)).unwrap();
        assert_eq!(
            store.job(&job.id).unwrap().unwrap().status,
            JobStatus::Closed
        );
    }

    #[test]
    fn test_update_unknown_job_changes_nothing() {
        let known = make_job();
        let mut state = StoreState::empty();
        state.insert_job(known.clone());

        let mut closed = known.clone();
        closed.close(None);
        let result = state.update_jobs(&[closed, make_job()]);

        assert!(matches!(result, Err(StoreError::UnknownRecord { .. })));
        assert_eq!(state.jobs[0].status, JobStatus::Open);
    }
}
