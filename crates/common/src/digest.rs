//! Content digests
//!
//! Frames are identified by the SHA-256 digest of their full file bytes.
//! Two files with the same digest are the same frame, whatever their names
//! or timestamps.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use dashmap::DashSet;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::Result;

/// Compute SHA-256 hash of data
pub fn hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA-256 hash of a file
pub fn hash_file(path: impl AsRef<Path>) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024]; // 64KB buffer

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Set of digests already seen during one assembly pass.
///
/// Must be created fresh for every test; it is never shared between tests.
#[derive(Debug, Default)]
pub struct DigestSet {
    seen: DashSet<String>,
}

impl DigestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `digest`, returning true if it had not been seen before
    pub fn insert(&self, digest: String) -> bool {
        self.seen.insert(digest)
    }

    /// Hash the file and record its digest, returning true for the first
    /// file carrying that content
    pub fn is_new_file(&self, path: &Path) -> Result<bool> {
        let digest = hash_file(path)?;
        let new = self.insert(digest);
        if !new {
            trace!("Discarding duplicate frame {}", path.display());
        }
        Ok(new)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
