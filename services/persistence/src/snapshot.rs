//! Snapshot file: the on-disk form of the whole key-space
//!
//! Features:
//! - Full store state serialization (jobs and bids) with bincode
//! - SHA-256 integrity hash over the serialized state
//! - Optional zstd compression, detected on load from the frame magic
//! - Snapshot versioning for forward compatibility
//! - Atomic replace: write temp file, fsync, rename over the old snapshot

use auction_engine::StoreState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::errors::StoreError;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    #[error("Compression error: {0}")]
    Compression(String),
}

impl From<SnapshotError> for StoreError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Io(e) => StoreError::Io(e.to_string()),
            SnapshotError::IntegrityFailure { expected, actual } => {
                StoreError::Integrity { expected, actual }
            }
            other => StoreError::Serialization(other.to_string()),
        }
    }
}

// ── Snapshot ────────────────────────────────────────────────────────

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// First bytes of every zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// A complete copy of the store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version for forward compatibility.
    pub version: u32,
    /// When the snapshot was written.
    pub taken_at: DateTime<Utc>,
    /// Jobs and bids.
    pub state: StoreState,
    /// SHA-256 hash of the serialized state.
    pub checksum: String,
}

impl Snapshot {
    /// Create a new snapshot with computed integrity hash.
    pub fn new(taken_at: DateTime<Utc>, state: StoreState) -> Result<Self, SnapshotError> {
        let checksum = compute_hash(&state)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            taken_at,
            state,
            checksum,
        })
    }

    /// Verify the snapshot's integrity hash.
    pub fn verify_integrity(&self) -> Result<(), SnapshotError> {
        let actual = compute_hash(&self.state)?;
        if actual == self.checksum {
            Ok(())
        } else {
            Err(SnapshotError::IntegrityFailure {
                expected: self.checksum.clone(),
                actual,
            })
        }
    }
}

/// Deterministic SHA-256 hex digest of the state.
pub fn compute_hash(state: &StoreState) -> Result<String, SnapshotError> {
    let bytes =
        bincode::serialize(state).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

// ── Snapshot Writer ─────────────────────────────────────────────────

/// Writes the snapshot file with optional zstd compression.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
    compress: bool,
}

impl SnapshotWriter {
    /// Create a new writer. `compress` enables zstd compression.
    pub fn new(path: impl Into<PathBuf>, compress: bool) -> Self {
        Self {
            path: path.into(),
            compress,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot file atomically: serialize → compress → temp file → rename.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let dir = match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => dir,
            None => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let data = bincode::serialize(snapshot)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        let final_data = if self.compress {
            zstd::encode_all(data.as_slice(), 3)
                .map_err(|e| SnapshotError::Compression(e.to_string()))?
        } else {
            data
        };

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&final_data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        // The rename is only durable once the directory entry is
        sync_dir(dir)?;

        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

// ── Snapshot Loader ─────────────────────────────────────────────────

/// Load a snapshot file, verifying version and integrity.
///
/// Returns `Ok(None)` when the file does not exist yet.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let decompressed = if data.starts_with(&ZSTD_MAGIC) {
        zstd::decode_all(data.as_slice()).map_err(|e| SnapshotError::Compression(e.to_string()))?
    } else {
        data
    };

    let snapshot: Snapshot = bincode::deserialize(&decompressed)
        .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }
    snapshot.verify_integrity()?;

    Ok(Some(snapshot))
}

// ── Tests ───────────────────────────────────────────────────────────
