/*!
 * Cache Types
 * Configuration and statistics for the sharded cache
 */

use crate::core::limits::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, SHARD_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the total capacity
pub const ENV_CACHE_CAPACITY: &str = "SYSPRIMS_CACHE_CAPACITY";

/// Environment variable overriding the default TTL, in seconds
pub const ENV_CACHE_TTL_SECS: &str = "SYSPRIMS_CACHE_TTL_SECS";

/// Cache configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Total entries across all shards (0 selects `DEFAULT_CACHE_CAPACITY`)
    pub capacity: usize,
    /// TTL applied when `set` gets no override; zero means never expire
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            default_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl CacheConfig {
    /// Configuration for a few hundred hot entries
    pub const fn small() -> Self {
        Self {
            capacity: 256,
            default_ttl: Duration::from_secs(60),
        }
    }

    /// Configuration for large working sets
    pub const fn large() -> Self {
        Self {
            capacity: 1 << 20,
            default_ttl: Duration::from_secs(3600),
        }
    }

    /// Set the total capacity
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the default TTL
    pub const fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Defaults overridden by `SYSPRIMS_CACHE_CAPACITY` and
    /// `SYSPRIMS_CACHE_TTL_SECS`; unparsable values are ignored
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(ENV_CACHE_CAPACITY) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => config.capacity = capacity,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_CACHE_CAPACITY),
            }
        }

        if let Ok(raw) = std::env::var(ENV_CACHE_TTL_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.default_ttl = Duration::from_secs(secs),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_CACHE_TTL_SECS),
            }
        }

        config
    }

    /// Capacity of each shard: `max(1, capacity / SHARD_COUNT)`
    pub fn shard_capacity(&self) -> usize {
        let total = if self.capacity == 0 {
            DEFAULT_CACHE_CAPACITY
        } else {
            self.capacity
        };
        (total / SHARD_COUNT).max(1)
    }
}

/// Aggregated cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub forced_evictions: u64,
    pub expirations: u64,
    pub hit_rate: f64,
}

/// Per-shard occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShardStats {
    pub index: usize,
    pub size: usize,
    pub capacity: usize,
    pub bucket_count: usize,
    pub tombstones: usize,
}
