//! On-disk cache for successful Spotify responses.
//!
//! Entries are keyed by a SHA-256 digest of the endpoint path and its sorted
//! query parameters. Entries are never expired automatically: release listings
//! and pagination identifiers are treated as immutable once observed, so a
//! cached payload stays valid for the lifetime of the cache directory.
//! Deleting the directory is the only invalidation (in particular, a release
//! reassigned to a different label after first observation will not be seen
//! until then).

use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ResponseCache {
    dir: PathBuf,
}

impl ResponseCache {
    pub fn new(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Deterministic cache key for a request: endpoint plus sorted parameters.
    pub fn request_key(path: &str, params: &[(String, String)]) -> String {
        let mut sorted: Vec<&(String, String)> = params.iter().collect();
        sorted.sort();

        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        for (key, value) in sorted {
            hasher.update(b"\0");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.entry_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Store a payload. The entry is written to a temporary file and renamed
    /// into place, so a concurrent reader never observes a partial entry.
    pub fn put(&self, key: &str, payload: &[u8]) -> io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(payload)?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        debug!("Cached {} bytes under {}", payload.len(), key);
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}
