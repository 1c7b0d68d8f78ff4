//! Cache Entry Module
//!
//! Defines the persisted record for a single cached value with TTL support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::clock::duration_ms;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
///
/// The key is not stored here: entries live in a map keyed by it, both in
/// memory and in the backing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored, already encoded value
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry written at `now_ms` and living for `ttl`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now_ms` - Write time in Unix milliseconds
    /// * `ttl` - Time to live; zero yields an entry that is already expired
    pub fn new(value: String, now_ms: u64, ttl: Duration) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(duration_ms(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration time, so a TTL of zero is
    /// expired on the very next read.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now_ms` (0 once expired).
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_704_067_200_000;

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value".to_string(), NOW, Duration::from_secs(60));

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.created_at, NOW);
        assert_eq!(entry.expires_at, NOW + 60_000);
        assert!(!entry.is_expired(NOW));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value".to_string(), NOW, Duration::from_millis(1000));

        assert!(!entry.is_expired(NOW + 999));
        assert!(entry.is_expired(NOW + 1000));
        assert!(entry.is_expired(NOW + 5000));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new("test_value".to_string(), NOW, Duration::ZERO);

        assert!(entry.is_expired(NOW), "Zero TTL should be expired at write time");
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new("test_value".to_string(), NOW, Duration::from_secs(10));

        assert_eq!(entry.ttl_remaining_ms(NOW), 10_000);
        assert_eq!(entry.ttl_remaining_ms(NOW + 9_000), 1_000);
        assert_eq!(entry.ttl_remaining_ms(NOW + 20_000), 0);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new("test_value".to_string(), NOW, Duration::MAX);

        assert_eq!(entry.expires_at, u64::MAX);
        assert!(!entry.is_expired(NOW));
    }

    #[test]
    fn test_entry_serde_shape() {
        let entry = CacheEntry::new("v".to_string(), 10, Duration::from_millis(5));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["value"], "v");
        assert_eq!(json["created_at"], 10);
        assert_eq!(json["expires_at"], 15);
    }
}
