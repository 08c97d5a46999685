//! Error types for the auction engine
//!
//! Every request-level failure maps to one of these variants; the gateway
//! turns them into HTTP statuses.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ids::JobId;
use crate::numeric::format_amount;

/// Top-level auction error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuctionError {
    /// Missing or oversized input
    #[error("{0}")]
    Validation(String),

    #[error("Job not found")]
    NotFound { job_id: String },

    #[error("Bidding closed")]
    AuctionClosed { job_id: JobId },

    #[error("Invalid amount")]
    InvalidAmount,

    /// A positive amount too large or too precise to hold exactly
    #[error("Amount out of range")]
    AmountOutOfRange,

    /// The bid was not strictly below the current lowest
    #[error("Bid must be lower than current lowest (${})", format_amount(.lowest))]
    BidTooHigh { lowest: Decimal },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuctionError {
    pub fn validation(message: impl Into<String>) -> Self {
        AuctionError::Validation(message.into())
    }

    pub fn not_found(job_id: impl ToString) -> Self {
        AuctionError::NotFound {
            job_id: job_id.to_string(),
        }
    }
}

/// Persistence failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Integrity check failed: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    #[error("Unknown record: {id}")]
    UnknownRecord { id: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}
