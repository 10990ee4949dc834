//! Per-entry resolver cache.
//!
//! One JSON record per entry, named by the SHA-256 of the entry id, so
//! unchanged entries skip redundant resolution on later runs.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use awesomehub_shared::{HubError, Result};

/// Largest TTL `chrono::Duration` can represent in seconds.
const MAX_TTL_SECS: u64 = (i64::MAX / 1_000) as u64;

/// A cached resolution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub id: String,
    pub stored_at: DateTime<Utc>,
    pub attributes: Map<String, Value>,
}

/// Directory-backed cache of resolved entry attributes.
#[derive(Debug, Clone)]
pub struct EntryCache {
    dir: PathBuf,
    ttl: Option<Duration>,
}

impl EntryCache {
    /// Open (creating if needed) a cache directory. `ttl_secs == 0` keeps
    /// records forever.
    pub fn open(dir: impl Into<PathBuf>, ttl_secs: u64) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| HubError::io(&dir, e))?;
        let ttl = match ttl_secs {
            0 => None,
            secs => Some(Duration::seconds(secs.min(MAX_TTL_SECS) as i64)),
        };
        Ok(Self { dir, ttl })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        self.dir.join(format!("{:x}.json", hasher.finalize()))
    }

    fn is_fresh(&self, record: &CacheRecord) -> bool {
        match self.ttl {
            Some(ttl) => Utc::now() - record.stored_at < ttl,
            None => true,
        }
    }

    /// Fetch a fresh record; stale or missing records yield `None`.
    pub fn get(&self, id: &str) -> Result<Option<CacheRecord>> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| HubError::io(&path, e))?;
        let record: CacheRecord = serde_json::from_str(&content)
            .map_err(|e| HubError::Cache(format!("corrupt record {}: {e}", path.display())))?;

        if !self.is_fresh(&record) {
            debug!(entry_id = id, "cache record is stale");
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Whether a fresh, readable record exists.
    pub fn contains(&self, id: &str) -> bool {
        matches!(self.get(id), Ok(Some(_)))
    }

    pub fn put(&self, id: &str, attributes: &Map<String, Value>) -> Result<CacheRecord> {
        let record = CacheRecord {
            id: id.to_string(),
            stored_at: Utc::now(),
            attributes: attributes.clone(),
        };
        let path = self.record_path(id);
        let content = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, content).map_err(|e| HubError::io(&path, e))?;
        Ok(record)
    }

    /// Delete a record. Returns whether one existed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path).map_err(|e| HubError::io(&path, e))?;
        Ok(true)
    }
}
