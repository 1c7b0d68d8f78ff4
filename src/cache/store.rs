//! Cache Store Module
//!
//! File-backed key-value store with TTL expiration. The whole store lives in
//! memory while open and is written through to a JSON file on every `set`, so
//! later invocations of the tool observe earlier writes.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

// == On-disk Layout ==
#[derive(Debug, Default, Deserialize)]
struct CacheFile {
    #[serde(default)]
    entries: BTreeMap<String, CacheEntry>,
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    entries: &'a BTreeMap<String, CacheEntry>,
}

// == Cache Store ==
/// Persisted cache storage with TTL support.
///
/// Open it once per run with [`CacheStore::open`], pass it by reference (or
/// hand it to a [`crate::cache::Memoizer`]), and finish with
/// [`CacheStore::close`]. Storage failures never escape `open` or `close`:
/// an unreadable file opens as an empty store.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: BTreeMap<String, CacheEntry>,
    /// Backing file, None for an in-memory store
    path: Option<PathBuf>,
    /// Source of the current time
    clock: Arc<dyn Clock>,
    /// Activity statistics for this run
    stats: CacheStats,
    /// True when memory holds changes not yet persisted
    dirty: bool,
}

impl CacheStore {
    // == Constructors ==
    /// Opens the store backed by the JSON file at `path`.
    ///
    /// A missing file yields an empty store. A file that cannot be read or
    /// parsed is logged and also yields an empty store; it is overwritten by
    /// the next successful write.
    pub async fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        let path = path.into();
        let entries = match load_entries(&path).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable cache file");
                BTreeMap::new()
            }
        };

        debug!(path = %path.display(), entries = entries.len(), "Cache store opened");

        let mut store = Self {
            entries,
            path: Some(path),
            clock,
            stats: CacheStats::new(),
            dirty: false,
        };
        store.stats.set_total_entries(store.entries.len());
        store
    }

    /// Creates a store that is never persisted.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: BTreeMap::new(),
            path: None,
            clock,
            stats: CacheStats::new(),
            dirty: false,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is empty, was never set, or its entry has
    /// expired. Expired entries are dropped from memory on read.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = self.clock.now_ms();
        let value = match self.entries.get(key).filter(|_| !key.is_empty()) {
            Some(entry) if entry.is_expired(now) => {
                self.entries.remove(key);
                self.dirty = true;
                self.stats.set_total_entries(self.entries.len());
                debug!(key, "Cache entry expired");
                None
            }
            Some(entry) => {
                debug!(key, ttl_remaining_ms = entry.ttl_remaining_ms(now), "Cache hit");
                Some(entry.value.clone())
            }
            None => None,
        };

        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        value
    }

    // == Set ==
    /// Stores a value under `key` for `ttl`, replacing any previous entry.
    ///
    /// The in-memory entry is always updated. The returned error only reports
    /// that the write could not be persisted.
    ///
    /// # Arguments
    /// * `key` - Non-empty key of at most `MAX_KEY_LENGTH` bytes
    /// * `value` - The encoded value to store
    /// * `ttl` - Time to live; zero makes the entry expired on the next read
    pub async fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Duration,
    ) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;

        let entry = CacheEntry::new(value.into(), self.clock.now_ms(), ttl);
        debug!(key = %key, expires_at = entry.expires_at, "Cache entry written");
        self.entries.insert(key, entry);
        self.dirty = true;
        self.stats.record_write();
        self.stats.set_total_entries(self.entries.len());

        self.flush().await
    }

    // == Remove ==
    /// Removes an entry by key. Returns true if an entry was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.dirty = true;
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Discard ==
    /// Drops an entry returned by the last `get` that the caller could not
    /// use, and counts that lookup as a miss.
    pub fn discard(&mut self, key: &str) -> bool {
        self.stats.record_discarded_hit();
        self.remove(key)
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.dirty = true;
            self.stats.set_total_entries(0);
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from memory.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let count = before - self.entries.len();
        if count > 0 {
            self.dirty = true;
        }
        self.stats.record_purged(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Flush ==
    /// Persists pending changes to the backing file, if any.
    pub async fn flush(&mut self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            self.dirty = false;
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        persist_entries(path, &self.entries).await?;
        self.dirty = false;
        Ok(())
    }

    // == Close ==
    /// Purges expired entries, persists pending changes and returns the
    /// statistics of this run. Persistence failures are logged.
    pub async fn close(mut self) -> CacheStats {
        let purged = self.cleanup_expired();
        if let Err(err) = self.flush().await {
            warn!(error = %err, "Failed to persist cache on close");
        }

        info!(
            "Cache closed: hits={}, misses={}, hit_rate={:.2}, writes={}, purged={}, entries={}",
            self.stats.hits,
            self.stats.misses,
            self.stats.hit_rate(),
            self.stats.writes,
            purged,
            self.entries.len()
        );
        self.stats
    }

    // == Accessors ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Returns the number of entries held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Helpers ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

fn unavailable(path: &Path, reason: impl ToString) -> CacheError {
    CacheError::Unavailable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

async fn load_entries(path: &Path) -> Result<BTreeMap<String, CacheEntry>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => return Err(unavailable(path, err)),
    };

    serde_json::from_slice::<CacheFile>(&bytes)
        .map(|file| file.entries)
        .map_err(|err| unavailable(path, err))
}

/// Writes the entries to a sibling temp file and renames it over `path`, so
/// concurrent readers see either the old or the new file.
async fn persist_entries(path: &Path, entries: &BTreeMap<String, CacheEntry>) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|err| unavailable(path, err))?;
    }

    let bytes = serde_json::to_vec_pretty(&CacheFileRef { entries })
        .map_err(|err| unavailable(path, err))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", std::process::id()));
    let tmp = PathBuf::from(tmp);

    if let Err(err) = tokio::fs::write(&tmp, &bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(unavailable(path, err));
    }
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(unavailable(path, err));
    }
    Ok(())
}
