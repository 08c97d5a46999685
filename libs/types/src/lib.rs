//! Types library for the reverse-auction marketplace
//!
//! This library provides the record types shared by the auction engine, the
//! persistence layer and the HTTP gateway.
//!
//! # Modules
//! - `ids`: Unique identifiers (JobId, BidId)
//! - `numeric`: Decimal bid amounts
//! - `time`: Timestamp parsing
//! - `job`: Job records, creation input and stats
//! - `bid`: Bid records
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod time;
pub mod job;
pub mod bid;
pub mod errors;
