/*!
 * Synchronization Primitives
 *
 * Blocking locks used by the concurrent data structures of this crate.
 * The arena serializes on a plain `parking_lot::Mutex`; cache shards use the
 * reader-writer lock below so lookups proceed in parallel.
 */

pub mod locks;

pub use locks::{ReadGuard, ShardLock, WriteGuard};
