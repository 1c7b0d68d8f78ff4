//! Cache Statistics Module
//!
//! Tracks per-run cache activity: hits, misses, writes and purged entries.

// == Cache Stats ==
/// Tracks cache activity for the lifetime of one open store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries written
    pub writes: u64,
    /// Number of expired entries physically removed
    pub purged: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Reclassifies the most recent hit as a miss, for a value the caller
    /// could not use.
    pub fn record_discarded_hit(&mut self) {
        if self.hits > 0 {
            self.hits -= 1;
            self.misses += 1;
        }
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_purged(&mut self, count: usize) {
        self.purged += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_discarded_hit_counts_as_miss() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_discarded_hit();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);

        // Nothing to reclassify
        stats.record_discarded_hit();
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_record_writes_and_purges() {
        let mut stats = CacheStats::new();
        stats.record_write();
        stats.record_write();
        stats.record_purged(3);
        stats.record_purged(0);
        assert_eq!(stats.writes, 2);
        assert_eq!(stats.purged, 3);
    }
}
