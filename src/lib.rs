/*!
 * sysprims
 *
 * Low-level building blocks for systems code:
 * - Region-based arena allocation over OS pages
 * - A sharded, reference-counted CLOCK cache with TTLs and snapshots
 * - Small-string-optimized, NUL-terminated byte strings
 */

pub mod cache;
pub mod core;
pub mod monitoring;

// Re-exports
pub use cache::{Cache, CacheConfig, CacheRef, CacheStats, ShardStats};
pub use crate::core::data_structures::{SsoString, StrView};
pub use crate::core::errors::*;
pub use crate::core::memory::{Arena, ArenaConfig, ArenaStats, ThreadArenaGuard};
pub use monitoring::init_tracing;
