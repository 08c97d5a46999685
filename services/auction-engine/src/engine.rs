//! Auction engine core
//!
//! Owns the Open → Closed state machine, admits bids and picks winners.
//!
//! Bid admission and closing are linearized per job through a lock table:
//! the "strictly below current lowest" check and the insert happen under the
//! job's lock, and closing re-reads the job and its bids under the same lock.
//! Sweeps are serialized among themselves and take job locks in id order, so
//! a sweep and any number of bids can never deadlock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use types::bid::Bid;
use types::errors::AuctionError;
use types::ids::JobId;
use types::job::{
    normalize_title, utf16_len, Job, JobStats, JobStatus, JobView, NewJob, MAX_BODY_UNITS,
};
use types::numeric::{is_valid_amount, AmountError};
use types::time::parse_timestamp;

use crate::stats::{compute_stats, winning_bid};
use crate::store::Store;

/// Main auction engine
pub struct AuctionEngine {
    store: Arc<dyn Store>,
    /// One mutex per job that has ever been bid on or closed
    job_locks: DashMap<JobId, Arc<Mutex<()>>>,
    /// Serializes sweeps
    sweep_lock: Mutex<()>,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Jobs closed by this sweep, in id order
    pub closed: Vec<JobId>,
}

impl AuctionEngine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            job_locks: DashMap::new(),
            sweep_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Publish a new job
    ///
    /// Required: description, requirements, posterName, posterContact and
    /// expiresAt. A blank title becomes "Untitled Job"; long titles are
    /// truncated. The deadline is not required to lie after `now`.
    pub fn create_job(&self, input: NewJob, now: DateTime<Utc>) -> Result<JobView, AuctionError> {
        let NewJob {
            title,
            description,
            requirements,
            poster_name,
            poster_contact,
            expires_at,
        } = input;

        let (
            Some(description),
            Some(requirements),
            Some(poster_name),
            Some(poster_contact),
            Some(expires_at),
        ) = (
            present(description),
            present(requirements),
            present(poster_name),
            present(poster_contact),
            present(expires_at),
        )
        else {
            return Err(AuctionError::validation("Missing required fields"));
        };

        if utf16_len(&description) > MAX_BODY_UNITS || utf16_len(&requirements) > MAX_BODY_UNITS {
            return Err(AuctionError::validation(
                "Description/requirements too long",
            ));
        }

        let expires_at = parse_timestamp(&expires_at)
            .ok_or_else(|| AuctionError::validation("Invalid expiresAt"))?;

        let job = Job {
            id: JobId::new(),
            title: normalize_title(title.as_deref()),
            description,
            requirements,
            poster_name,
            poster_contact,
            published_at: now,
            expires_at,
            status: JobStatus::Open,
            winner_bid_id: None,
        };

        self.store.insert_job(job.clone())?;

        info!(
            job_id = %job.id,
            expires_at = %job.expires_at,
            "Job published"
        );

        Ok(JobView {
            job,
            stats: JobStats::default(),
        })
    }

    /// Submit a bid
    ///
    /// `amount` carries the parse outcome of the submitted value, so that a
    /// closed job is reported before a malformed amount.
    /// The job is closed first if its deadline has passed, so a just-expired
    /// job never admits a bid.
    pub fn place_bid(
        &self,
        job_id: &JobId,
        amount: Result<Decimal, AmountError>,
        now: DateTime<Utc>,
    ) -> Result<Bid, AuctionError> {
        // Unknown ids never get a lock table entry
        if self.store.job(job_id)?.is_none() {
            return Err(AuctionError::not_found(job_id));
        }

        let lock = self.job_lock(job_id);
        let _guard = lock_mutex(&lock);

        let mut job = self
            .store
            .job(job_id)?
            .ok_or_else(|| AuctionError::not_found(job_id))?;
        let bids = self.store.bids_for_job(job_id)?;

        if job.is_open() && job.is_due(now) {
            job = close_job(job, &bids, now);
            match self.store.update_jobs(std::slice::from_ref(&job)) {
                Ok(()) => log_closed(&job),
                Err(err) => {
                    // Still rejected below; the next sweep persists the close
                    warn!(job_id = %job.id, error = %err, "Failed to persist job close");
                }
            }
        }

        if !job.is_open() {
            debug!(job_id = %job_id, "Bid rejected: bidding closed");
            return Err(AuctionError::AuctionClosed { job_id: *job_id });
        }

        let amount = match amount {
            Ok(amount) if is_valid_amount(amount) => amount,
            Err(AmountError::OutOfRange) => {
                debug!(job_id = %job_id, "Bid rejected: amount out of range");
                return Err(AuctionError::AmountOutOfRange);
            }
            _ => {
                debug!(job_id = %job_id, "Bid rejected: invalid amount");
                return Err(AuctionError::InvalidAmount);
            }
        };

        let stats = compute_stats(job_id, &bids);
        if let Some(lowest) = stats.lowest_bid {
            if amount >= lowest {
                debug!(
                    job_id = %job_id,
                    amount = %amount,
                    lowest = %lowest,
                    "Bid rejected: not below current lowest"
                );
                return Err(AuctionError::BidTooHigh { lowest });
            }
        }

        let bid = Bid::new(*job_id, amount, now);
        self.store.insert_bid(bid.clone())?;

        info!(
            job_id = %job_id,
            bid_id = %bid.id,
            amount = %bid.amount,
            bids_count = stats.bids_count + 1,
            "Bid admitted"
        );

        Ok(bid)
    }

    /// Close every open job whose deadline is at or before `now`
    ///
    /// All closes of one sweep are persisted in a single batch. On failure
    /// nothing is closed and the jobs stay open until the next sweep.
    pub fn sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, AuctionError> {
        let _sweep = lock_mutex(&self.sweep_lock);

        let mut due: Vec<JobId> = self
            .store
            .jobs()?
            .iter()
            .filter(|job| job.is_open() && job.is_due(now))
            .map(|job| job.id)
            .collect();
        if due.is_empty() {
            return Ok(SweepReport::default());
        }
        due.sort();

        let locks: Vec<Arc<Mutex<()>>> = due.iter().map(|id| self.job_lock(id)).collect();
        let _guards: Vec<MutexGuard<'_, ()>> = locks.iter().map(|lock| lock_mutex(lock)).collect();

        // Re-read under the locks: a bid may have closed some of them already
        let bids = self.store.bids()?;
        let mut closed: Vec<Job> = self
            .store
            .jobs()?
            .into_iter()
            .filter(|job| due.binary_search(&job.id).is_ok())
            .filter(|job| job.is_open() && job.is_due(now))
            .map(|job| close_job(job, &bids, now))
            .collect();
        closed.sort_by_key(|job| job.id);

        if closed.is_empty() {
            return Ok(SweepReport::default());
        }

        self.store.update_jobs(&closed)?;
        closed.iter().for_each(log_closed);

        Ok(SweepReport {
            closed: closed.into_iter().map(|job| job.id).collect(),
        })
    }

    fn job_lock(&self, job_id: &JobId) -> Arc<Mutex<()>> {
        Arc::clone(&self.job_locks.entry(*job_id).or_default())
    }
}

/// Apply the expiry transition to `job` at `now`
///
/// Only an open job whose deadline has passed changes: it becomes Closed and
/// records the lowest bid among `bids` (the first one in admission order if
/// amounts ever tie). Anything else is returned untouched, which makes the
/// transition idempotent.
pub fn close_job(mut job: Job, bids: &[Bid], now: DateTime<Utc>) -> Job {
    if !job.is_open() || !job.is_due(now) {
        return job;
    }

    let job_bids: Vec<Bid> = bids
        .iter()
        .filter(|bid| bid.job_id == job.id)
        .cloned()
        .collect();
    let winner = winning_bid(&job_bids).map(|bid| bid.id);
    job.close(winner);
    job
}

fn log_closed(job: &Job) {
    match job.winner_bid_id {
        Some(winner) => info!(job_id = %job.id, winner_bid_id = %winner, "Job closed"),
        None => info!(job_id = %job.id, "Job closed without bids"),
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn lock_mutex(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
