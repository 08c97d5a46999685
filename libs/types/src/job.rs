//! Job lifecycle types
//!
//! A job is published Open and moves to Closed exactly once, when its
//! deadline passes. Closing is the only mutation a job ever sees.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{BidId, JobId};

/// Title used when the poster leaves it blank
pub const DEFAULT_TITLE: &str = "Untitled Job";

/// Maximum title length in UTF-16 code units (longer titles are truncated)
pub const MAX_TITLE_UNITS: usize = 200;

/// Maximum description / requirements length in UTF-16 code units
pub const MAX_BODY_UNITS: usize = 16 * 1024;

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepting bids
    Open,
    /// Deadline passed (terminal)
    Closed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

/// A published job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub poster_name: String,
    pub poster_contact: String,
    pub published_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: JobStatus,
    pub winner_bid_id: Option<BidId>,
}

impl Job {
    /// Check whether the deadline has been reached at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }

    /// Close the job, recording the winning bid if there is one
    ///
    /// # Panics
    /// Panics if the job is already closed
    pub fn close(&mut self, winner: Option<BidId>) {
        assert!(!self.status.is_terminal(), "Cannot close a closed job");

        self.status = JobStatus::Closed;
        self.winner_bid_id = winner;
    }
}

/// Job creation input, exactly as submitted
///
/// Every field is optional here; presence and length checks happen when the
/// engine admits the job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub poster_name: Option<String>,
    pub poster_contact: Option<String>,
    pub expires_at: Option<String>,
}

/// Bid statistics for one job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    pub bids_count: usize,
    /// None when no bid has been placed
    pub lowest_bid: Option<Decimal>,
}

/// A job augmented with its current bid statistics
#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub job: Job,
    pub stats: JobStats,
}

/// Length in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Truncate to at most `max_units` UTF-16 code units without splitting a
/// character.
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &text[..idx];
        }
    }
    text
}

/// Title to store for a submitted one: truncated, or the default when blank
pub fn normalize_title(title: Option<&str>) -> String {
    match title.map(|t| truncate_utf16(t, MAX_TITLE_UNITS)) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}
