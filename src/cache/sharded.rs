/*!
 * Sharded Cache
 * Fixed array of independently locked shards with zero-copy, TTL-aware reads
 */

use super::entry::{expiry_after, unix_millis, CacheRef, Entry};
use super::hash::KeyHash;
use super::shard::{Lookup, Shard};
use super::types::{CacheConfig, CacheStats, ShardStats};
use crate::core::errors::{CacheError, CacheResult};
use crate::core::limits::SHARD_COUNT;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sharded, reference-counted cache with CLOCK eviction
///
/// # Performance
///
/// - **Shard selection**: one FNV-1a pass, then a mask
/// - **Reads**: shard read lock only; the reference bit is an atomic
/// - **Writes**: shard write lock; at most one eviction per insert
///
/// # Lifetimes
///
/// Values returned by [`Cache::get`] are [`CacheRef`] handles into the
/// stored entry. They remain valid after `invalidate`, `set` on the same key,
/// `clear` and even after the cache is dropped; the entry is freed when the
/// last handle goes away.
///
/// # Example
///
/// ```ignore
/// let cache = Cache::new(10_000, Duration::from_secs(300));
/// cache.set(b"user:42", b"{\"name\":\"ada\"}")?;
/// if let Some(value) = cache.get(b"user:42") {
///     assert_eq!(&*value, b"{\"name\":\"ada\"}");
/// }
/// ```
pub struct Cache {
    shards: Box<[Shard]>,
    default_ttl: Duration,
}

impl Cache {
    /// Create a cache; `total_capacity == 0` selects the default capacity
    pub fn new(total_capacity: usize, default_ttl: Duration) -> Self {
        Self::with_config(CacheConfig {
            capacity: total_capacity,
            default_ttl,
        })
    }

    /// Create a cache from a configuration
    pub fn with_config(config: CacheConfig) -> Self {
        let per_shard = config.shard_capacity();
        let shards: Box<[Shard]> = (0..SHARD_COUNT).map(|_| Shard::new(per_shard)).collect();

        debug!(
            shards = SHARD_COUNT,
            per_shard_capacity = per_shard,
            default_ttl_secs = config.default_ttl.as_secs(),
            "Cache created"
        );

        Self {
            shards,
            default_ttl: config.default_ttl,
        }
    }

    /// TTL applied when no override is given
    #[inline]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    #[inline(always)]
    fn shard(&self, hash: KeyHash) -> &Shard {
        &self.shards[hash.shard_index()]
    }

    /// Insert or replace `key` with the default TTL
    pub fn set(&self, key: &[u8], value: &[u8]) -> CacheResult<()> {
        self.set_with_ttl(key, value, Duration::ZERO)
    }

    /// Insert or replace `key`; a zero `ttl` falls back to the default TTL
    ///
    /// Key and value are copied into a single new entry. On error the cache
    /// is unchanged.
    pub fn set_with_ttl(&self, key: &[u8], value: &[u8], ttl: Duration) -> CacheResult<()> {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        self.insert_with_expiry(key, value, expiry_after(ttl))
    }

    /// Insert with an absolute expiry (Unix milliseconds)
    pub(crate) fn insert_with_expiry(
        &self,
        key: &[u8],
        value: &[u8],
        expires_at: i64,
    ) -> CacheResult<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        let hash = KeyHash::of(key);
        let entry = Entry::build(hash, key, value, expires_at)?;
        let outcome = self.shard(hash).insert(entry);
        // Evicted entries are freed here, outside the shard lock
        drop(outcome.evicted);
        Ok(())
    }

    /// Zero-copy lookup
    ///
    /// Marks the entry recently used. An expired entry counts as a miss and
    /// is invalidated on the way out.
    pub fn get(&self, key: &[u8]) -> Option<CacheRef> {
        if key.is_empty() {
            return None;
        }

        let hash = KeyHash::of(key);
        let shard = self.shard(hash);
        match shard.get(hash, key, unix_millis()) {
            Lookup::Hit(handle) => Some(handle),
            Lookup::Miss => None,
            Lookup::Expired(entry) => {
                shard.remove_expired(&entry);
                None
            }
        }
    }

    /// Check whether a live, unexpired entry exists for `key`
    pub fn contains(&self, key: &[u8]) -> bool {
        if key.is_empty() {
            return false;
        }
        let hash = KeyHash::of(key);
        self.shard(hash).contains(hash, key, unix_millis())
    }

    /// Give up a handle returned by [`Cache::get`]
    #[inline]
    pub fn release(handle: CacheRef) {
        handle.release();
    }

    /// Remove `key`; returns whether it was present
    ///
    /// Outstanding handles keep the value readable.
    pub fn invalidate(&self, key: &[u8]) -> bool {
        if key.is_empty() {
            return false;
        }
        let hash = KeyHash::of(key);
        self.shard(hash).remove(hash, key).is_some()
    }

    /// Remove every entry, shard by shard; returns how many were dropped
    pub fn clear(&self) -> usize {
        let dropped: usize = self.shards.iter().map(Shard::clear).sum();
        debug!(dropped, "Cache cleared");
        dropped
    }

    /// Drop every expired entry now instead of waiting for an access
    pub fn purge_expired(&self) -> usize {
        let now = unix_millis();
        self.shards.iter().map(|shard| shard.purge_expired(now)).sum()
    }

    /// Number of entries across all shards
    pub fn total_size(&self) -> usize {
        self.shards.iter().map(Shard::size).sum()
    }

    /// Sum of shard capacities
    pub fn total_capacity(&self) -> usize {
        self.shards.iter().map(Shard::capacity).sum()
    }

    /// Per-shard occupancy
    pub fn shard_stats(&self) -> Vec<ShardStats> {
        self.shards
            .iter()
            .enumerate()
            .map(|(index, shard)| shard.stats(index))
            .collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut totals = [0u64; 5];
        for shard in self.shards.iter() {
            for (total, value) in totals.iter_mut().zip(shard.counters()) {
                *total += value;
            }
        }
        let [hits, misses, evictions, forced_evictions, expirations] = totals;
        let lookups = hits + misses;
        let hit_rate = if lookups > 0 {
            (hits as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            size: self.total_size(),
            capacity: self.total_capacity(),
            hits,
            misses,
            evictions,
            forced_evictions,
            expirations,
            hit_rate,
        }
    }

    /// Live entries of every shard, each shard read under its own lock
    pub(crate) fn snapshot_shards(&self) -> impl Iterator<Item = Vec<Arc<Entry>>> + '_ {
        self.shards.iter().map(Shard::snapshot)
    }

    /// Tear the cache down
    ///
    /// Drops the table's reference to every entry. Handles still held by
    /// readers stay valid until released.
    pub fn destroy(self) {
        debug!(size = self.total_size(), "Cache destroyed");
        drop(self);
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::with_config(CacheConfig::default())
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("shards", &self.shards.len())
            .field("size", &self.total_size())
            .field("capacity", &self.total_capacity())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
