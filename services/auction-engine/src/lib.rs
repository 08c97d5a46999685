//! Auction Engine Service
//!
//! Runs reverse auctions: a job is published with a deadline, bidders submit
//! strictly decreasing prices, and the lowest bid standing at the deadline
//! wins.
//!
//! **Key Invariants:**
//! - Bids admitted for one job are strictly decreasing
//! - A job moves Open → Closed exactly once and never reopens
//! - The winner is a bid holding the minimum amount at closing time
//!
//! # Architecture
//!
//! ```text
//!   HTTP gateway ──► QueryService ──┐
//!        │                          │ (sweep before reads)
//!        └────────► AuctionEngine ◄─┴── ExpiryScheduler (timer)
//!                        │
//!                      Store
//! ```

pub mod store;
pub mod stats;
pub mod engine;
pub mod expiry;
pub mod query;

pub use engine::AuctionEngine;
pub use expiry::{ExpiryScheduler, SchedulerConfig};
pub use query::{JobQuery, QueryService};
pub use store::{MemoryStore, Store, StoreState};
