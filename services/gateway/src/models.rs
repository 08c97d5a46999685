use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::bid::Bid;
use types::ids::{BidId, JobId};
use types::job::{JobStatus, JobView};

/// Body of `POST /jobs/{id}/bids`
///
/// The amount is kept raw so that numbers and numeric strings are both
/// accepted, and anything else is reported as an invalid amount.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceBidRequest {
    #[serde(default)]
    pub amount: serde_json::Value,
}

/// Query string of `GET /jobs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListJobsParams {
    /// `field:dir`
    pub sort: Option<String>,
    pub limit: Option<String>,
}

/// Query string of `GET /jobs/active`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveJobsParams {
    pub limit: Option<String>,
}

/// A job with its live stats. Amounts go out as JSON numbers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub poster_name: String,
    pub poster_contact: String,
    pub published_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_bid_id: Option<BidId>,
    pub bids_count: usize,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub lowest_bid: Option<Decimal>,
}

impl From<JobView> for JobResponse {
    fn from(view: JobView) -> Self {
        let JobView { job, stats } = view;
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            requirements: job.requirements,
            poster_name: job.poster_name,
            poster_contact: job.poster_contact,
            published_at: job.published_at,
            expires_at: job.expires_at,
            status: job.status,
            winner_bid_id: job.winner_bid_id,
            bids_count: stats.bids_count,
            lowest_bid: stats.lowest_bid,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidResponse {
    pub id: BidId,
    pub job_id: JobId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Bid> for BidResponse {
    fn from(bid: Bid) -> Self {
        Self {
            id: bid.id,
            job_id: bid.job_id,
            amount: bid.amount,
            created_at: bid.created_at,
        }
    }
}
