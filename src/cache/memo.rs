//! Memoizer Module
//!
//! Get-or-compute-and-store around an async producer, keyed by a caller
//! chosen string.
//!
//! Keys are opaque to the memoizer: the caller must fold every input that
//! affects the producer's output into the key (for example
//! `report:2024-01-01:2024-01-14`). Nothing is fingerprinted automatically.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore, Codec, JsonCodec};

// == Memoizer ==
/// Owns the cache handle for a run and memoizes producers through it.
///
/// Calls take `&mut self`, so a single handle never runs two producers at
/// once. There is no in-flight registry across handles or processes: two
/// cold calls for the same key from different processes both run their
/// producer and the last write wins.
#[derive(Debug)]
pub struct Memoizer<C = JsonCodec> {
    store: CacheStore,
    codec: C,
}

impl Memoizer<JsonCodec> {
    /// Creates a memoizer that stores payloads as JSON.
    pub fn new(store: CacheStore) -> Self {
        Self::with_codec(store, JsonCodec)
    }
}

impl<C: Codec> Memoizer<C> {
    /// Creates a memoizer with an explicit codec.
    pub fn with_codec(store: CacheStore, codec: C) -> Self {
        Self { store, codec }
    }

    // == Autocache ==
    /// Returns the cached value for `key`, or runs `producer` and caches its
    /// result for `ttl`.
    ///
    /// On a hit the producer is never invoked. A cached value that fails to
    /// decode counts as a miss. A producer error is returned unchanged and
    /// nothing is written. Encoding or storage failures after a successful
    /// producer are logged; the produced value is still returned.
    pub async fn autocache<T, E, F, Fut>(
        &mut self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(raw) = self.store.get(key) {
            match self.codec.decode::<T>(&raw) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(key, error = %err, "Discarding undecodable cache entry");
                    self.store.discard(key);
                }
            }
        }

        debug!(key, "Cache miss, invoking producer");
        let value = producer().await?;
        self.store_value(key, ttl, &value).await;
        Ok(value)
    }

    // == Refresh ==
    /// Runs `producer` without consulting the cache and caches its result
    /// for `ttl`.
    ///
    /// The previous entry is only replaced once the producer succeeds; on a
    /// producer error it is left untouched and the error is returned.
    pub async fn refresh<T, E, F, Fut>(
        &mut self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        debug!(key, "Refreshing, invoking producer");
        let value = producer().await?;
        self.store_value(key, ttl, &value).await;
        Ok(value)
    }

    async fn store_value<T: Serialize>(&mut self, key: &str, ttl: Duration, value: &T) {
        match self.codec.encode(value) {
            Ok(encoded) => {
                if let Err(err) = self.store.set(key, encoded, ttl).await {
                    warn!(key, error = %err, "Failed to cache produced value");
                }
            }
            Err(err) => warn!(key, error = %err, "Produced value is not cacheable"),
        }
    }

    // == Accessors ==
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CacheStore {
        &mut self.store
    }

    /// Closes the underlying store. See [`CacheStore::close`].
    pub async fn close(self) -> CacheStats {
        self.store.close().await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{BincodeCodec, ManualClock};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const START: u64 = 1_704_067_200_000;
    const HOUR: Duration = Duration::from_secs(3600);

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("upstream failed: {0}")]
    struct UpstreamError(String);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Summary {
        merged: u32,
        titles: Vec<String>,
    }

    fn memoizer() -> (Memoizer, ManualClock) {
        let clock = ManualClock::new(START);
        let store = CacheStore::in_memory(Arc::new(clock.clone()));
        (Memoizer::new(store), clock)
    }

    async fn counted(
        memo: &mut Memoizer,
        calls: &Arc<AtomicUsize>,
        ttl: Duration,
    ) -> Result<Summary, UpstreamError> {
        let calls = Arc::clone(calls);
        memo.autocache("summary", ttl, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) as u32;
            Ok(Summary {
                merged: n + 1,
                titles: vec!["Add cache".to_string()],
            })
        })
        .await
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let (mut memo, _clock) = memoizer();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = counted(&mut memo, &calls, HOUR).await.unwrap();
        let second = counted(&mut memo, &calls, HOUR).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_expired_entry_invokes_producer_again() {
        let (mut memo, clock) = memoizer();
        let calls = Arc::new(AtomicUsize::new(0));

        counted(&mut memo, &calls, HOUR).await.unwrap();
        clock.advance(HOUR);
        let refreshed = counted(&mut memo, &calls, HOUR).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed.merged, 2);
    }

    #[tokio::test]
    async fn test_producer_error_propagates_without_write() {
        let (mut memo, _clock) = memoizer();

        let result: Result<Summary, UpstreamError> = memo
            .autocache("summary", HOUR, || async {
                Err(UpstreamError("502".to_string()))
            })
            .await;

        assert_eq!(result.unwrap_err(), UpstreamError("502".to_string()));
        assert!(memo.store().is_empty());
        assert_eq!(memo.store().stats().writes, 0);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_recomputed() {
        let (mut memo, _clock) = memoizer();
        memo.store_mut()
            .set("summary", "{ corrupted", HOUR)
            .await
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let value = counted(&mut memo, &calls, HOUR).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(value.merged, 1);
        // The unusable entry was a miss, not a hit
        let stats = memo.store().stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
        let raw = memo.store_mut().get("summary").unwrap();
        assert_eq!(serde_json::from_str::<Summary>(&raw).unwrap(), value);
    }

    #[tokio::test]
    async fn test_refresh_replaces_fresh_entry() {
        let (mut memo, _clock) = memoizer();
        let calls = Arc::new(AtomicUsize::new(0));
        counted(&mut memo, &calls, HOUR).await.unwrap();

        let refreshed: Result<u32, UpstreamError> =
            memo.refresh("summary", HOUR, || async { Ok(42) }).await;

        assert_eq!(refreshed.unwrap(), 42);
        let raw = memo.store_mut().get("summary").unwrap();
        assert_eq!(serde_json::from_str::<u32>(&raw).unwrap(), 42);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_entry() {
        let (mut memo, _clock) = memoizer();
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = counted(&mut memo, &calls, HOUR).await.unwrap();

        let refreshed: Result<Summary, UpstreamError> = memo
            .refresh("summary", HOUR, || async {
                Err(UpstreamError("timeout".to_string()))
            })
            .await;

        assert_eq!(refreshed.unwrap_err(), UpstreamError("timeout".to_string()));
        assert_eq!(counted(&mut memo, &calls, HOUR).await.unwrap(), cached);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_key_still_returns_value() {
        let (mut memo, _clock) = memoizer();

        let value: Result<u32, UpstreamError> =
            memo.autocache("", HOUR, || async { Ok(7) }).await;

        assert_eq!(value.unwrap(), 7);
        assert!(memo.store().is_empty());
    }

    #[tokio::test]
    async fn test_bincode_codec_memoizes_bytes() {
        let clock = ManualClock::new(START);
        let store = CacheStore::in_memory(Arc::new(clock));
        let mut memo = Memoizer::with_codec(store, BincodeCodec);
        let payload: Vec<u8> = (0..=255).collect();

        let expected = payload.clone();
        let first: Result<Vec<u8>, UpstreamError> =
            memo.autocache("bytes", HOUR, || async move { Ok(payload) }).await;
        let second: Result<Vec<u8>, UpstreamError> = memo
            .autocache("bytes", HOUR, || async {
                Err(UpstreamError("producer ran on a hit".to_string()))
            })
            .await;

        assert_eq!(first.unwrap(), expected);
        assert_eq!(second.unwrap(), expected);
    }
}
