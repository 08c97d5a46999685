//! Bid records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{BidId, JobId};

/// An admitted bid
///
/// Bids are immutable once admitted. For one job, every bid is strictly
/// lower than all bids admitted before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: BidId,
    pub job_id: JobId,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Bid {
    /// Create a new bid admitted at `timestamp`
    pub fn new(job_id: JobId, amount: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: BidId::new(),
            job_id,
            amount,
            created_at: timestamp,
        }
    }
}
