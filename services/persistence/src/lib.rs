//! Persistence Service
//!
//! Durable implementation of the auction engine's `Store`: the whole
//! key-space lives in memory and is rewritten to a checksummed snapshot file
//! on every mutation.
//!
//! # Guarantees
//! - A mutation is visible only after its snapshot reached the disk
//! - A failed write leaves both the file and the in-memory state unchanged
//! - Corrupted or tampered files are rejected at open

pub mod snapshot;
pub mod file_store;

pub use file_store::{FileStore, FileStoreConfig};
