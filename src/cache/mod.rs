//! Cache Module
//!
//! Provides a file-backed cache with TTL expiration and a memoizer that
//! wraps expensive async producers with get-or-compute-and-store semantics.

mod clock;
mod codec;
mod entry;
mod memo;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use entry::CacheEntry;
pub use memo::Memoizer;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// File name of the backing store inside the cache directory
pub const CACHE_FILE_NAME: &str = "cache.json";
