/*!
 * Reader-Writer Lock
 * Multi-reader / single-writer lock guarding one cache shard
 */

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;

/// Shared read access; the lock is released when the guard drops
pub type ReadGuard<'a, T> = RwLockReadGuard<'a, T>;

/// Exclusive write access; the lock is released when the guard drops
pub type WriteGuard<'a, T> = RwLockWriteGuard<'a, T>;

/// Reader-writer lock over `T`
///
/// Thin wrapper over `parking_lot::RwLock`: blocking acquisition, no
/// poisoning, fairness left to parking_lot. Unlocking is tied to guard
/// lifetime; `unlock_read`/`unlock_write` exist to make the release point
/// explicit at call sites that hand off between lock modes.
///
/// # Example
///
/// ```ignore
/// let lock = ShardLock::new(Table::new(64));
/// let table = lock.read();
/// let hit = table.lookup(key);
/// ShardLock::unlock_read(table);
/// ```
pub struct ShardLock<T> {
    inner: RwLock<T>,
}

impl<T> ShardLock<T> {
    /// Create a new unlocked lock
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    /// Acquire shared access, blocking while a writer holds the lock
    #[inline]
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.inner.read()
    }

    /// Acquire exclusive access, blocking while any guard is held
    #[inline]
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.inner.write()
    }

    /// Try to acquire shared access without blocking
    #[inline]
    pub fn try_read(&self) -> Option<ReadGuard<'_, T>> {
        self.inner.try_read()
    }

    /// Try to acquire exclusive access without blocking
    #[inline]
    pub fn try_write(&self) -> Option<WriteGuard<'_, T>> {
        self.inner.try_write()
    }

    /// Release shared access
    #[inline]
    pub fn unlock_read(guard: ReadGuard<'_, T>) {
        drop(guard);
    }

    /// Release exclusive access
    #[inline]
    pub fn unlock_write(guard: WriteGuard<'_, T>) {
        drop(guard);
    }

    /// Mutable access without locking, proven exclusive by `&mut self`
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    /// Destroy the lock, returning the protected value
    #[inline]
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: Default> Default for ShardLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for ShardLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.inner.is_locked_exclusive() {
            "write-locked"
        } else if self.inner.is_locked() {
            "read-locked"
        } else {
            "unlocked"
        };
        f.debug_struct("ShardLock").field("state", &state).finish()
    }
}
