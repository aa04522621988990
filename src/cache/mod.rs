/*!
 * Sharded Cache
 *
 * Concurrent key/value cache built from a fixed array of shards:
 * - FNV-1a hashing with the two lowest values reserved for slot states
 * - Open addressing with linear probing and packed slot metadata
 * - CLOCK (second-chance) eviction per shard
 * - Lazy TTL expiry on lookup, explicit purge on demand
 * - Zero-copy reads through reference-counted [`CacheRef`] handles
 * - Binary snapshots to disk
 *
 * # Performance
 *
 * - Reads take only the owning shard's read lock
 * - Writes to different shards never contend
 * - Shards are cache-line aligned to avoid false sharing
 */

mod entry;
mod hash;
mod persist;
mod shard;
mod sharded;
mod slot;
mod types;

pub use entry::{CacheRef, NEVER_EXPIRES};
pub use hash::KeyHash;
pub use sharded::Cache;
pub use types::{CacheConfig, CacheStats, ShardStats, ENV_CACHE_CAPACITY, ENV_CACHE_TTL_SECS};
