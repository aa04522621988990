/*!
 * System Limits and Constants
 *
 * Centralized location for the tunables of the arena, cache and string cores.
 * Organized by component for maintainability and discoverability.
 *
 * - Performance-critical constants are marked with [PERF]
 * - Values that are part of a persisted format are marked with [FORMAT]
 */

use std::time::Duration;

// =============================================================================
// ARENA
// =============================================================================

/// Default chunk size when an arena is created with `chunk_size == 0` (1MB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Alignment of every pointer handed out by an arena
/// Matches `alignof(max_align_t)` on 64-bit targets
pub const ARENA_ALIGN: usize = 16;

/// Bytes reserved in front of each allocation for its size header
/// Padded to `ARENA_ALIGN` so the user pointer stays aligned
pub const ARENA_HEADER_SIZE: usize = ARENA_ALIGN;

/// Fallback page size when the OS cannot be queried (4KB)
pub const FALLBACK_PAGE_SIZE: usize = 4096;

/// Maximum number of released chunks kept for reuse
/// [PERF] Bounds memory held by the pool while still absorbing reset churn
pub const CHUNK_POOL_DEPTH: usize = 16;

// =============================================================================
// CACHE
// =============================================================================

/// Number of independent shards in a cache
/// [PERF] Power of 2 so shard selection is a mask
pub const SHARD_COUNT: usize = 32;

/// Total capacity used when a cache is created with capacity 0
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Default entry time-to-live
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Buckets per unit of shard capacity
/// [PERF] Keeps the open-addressed table at most half full
pub const CACHE_LOAD_FACTOR: usize = 2;

/// Snapshot file magic
/// [FORMAT]
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"SPRC";

/// Snapshot format revision
/// [FORMAT]
pub const SNAPSHOT_VERSION: u32 = 1;

// =============================================================================
// SSO STRING
// =============================================================================

/// Inline buffer size, NUL terminator included
/// [PERF] 24 bytes keeps `SsoString` at four machine words
pub const SSO_INLINE_CAPACITY: usize = 24;

/// Longest string that stays inline
pub const SSO_MAX: usize = SSO_INLINE_CAPACITY - 1;

/// Smallest heap buffer a string is promoted into
pub const SSO_MIN_HEAP_CAPACITY: usize = 32;

/// Heap capacity multiplier applied until the request fits
pub const SSO_GROWTH_FACTOR: usize = 2;
