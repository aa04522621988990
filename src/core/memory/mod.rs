/*!
 * Memory Utilities
 *
 * Region-based memory management:
 * - System pages straight from the OS
 * - Arena allocation for bulk, short-lived allocations
 * - Chunk pooling so arena resets do not churn page mappings
 * - Thread-local default arena binding
 *
 * # Performance
 *
 * - Arena: O(1) bump allocation, O(1) in-place resize of the newest block
 * - Pool: Lock-free reuse of released chunks
 *
 * # Use Cases
 *
 * - **Arena**: Scratch memory for parsers, CLI flag tables, autocomplete results
 * - **Thread-local arena**: Code paths that cannot thread an arena handle through
 */

mod arena;
mod pages;
mod pool;
mod scope;

pub use arena::{Arena, ArenaConfig, ArenaStats};
pub use pages::{page_size, round_to_pages, system_alloc, system_free, PageRegion};
pub use pool::{ChunkPool, ChunkPoolStats};
pub use scope::{alloc_in, current, realloc_in, threadlocal, with_thread_arena, ThreadArenaGuard};
