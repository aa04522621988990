/*!
 * Lock-Based Synchronization Primitives
 *
 * - Reader-writer lock guarding cache shards
 */

mod rwlock;

// Re-export public API
pub use rwlock::{ReadGuard, ShardLock, WriteGuard};
