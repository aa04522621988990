/*!
 * Cache Entries and Value Handles
 *
 * An entry is an immutable snapshot of one key/value pair plus its CLOCK
 * reference bit. The table holds one `Arc` per live entry; every outstanding
 * [`CacheRef`] holds another, so a value stays readable until the last
 * handle drops, even after invalidation, replacement or cache teardown.
 */

use super::hash::KeyHash;
use crate::core::errors::{CacheError, CacheResult};
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// `expires_at` value for entries that never expire
pub const NEVER_EXPIRES: i64 = i64::MAX;

/// Current Unix time in milliseconds
#[inline]
pub(crate) fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Absolute expiry for a TTL measured from now; zero TTL never expires
#[inline]
pub(crate) fn expiry_after(ttl: Duration) -> i64 {
    if ttl.is_zero() {
        return NEVER_EXPIRES;
    }
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    unix_millis().saturating_add(ttl_ms)
}

pub(crate) struct Entry {
    clock_bit: AtomicBool,
    expires_at: i64,
    hash: KeyHash,
    key_len: u32,
    /// Key bytes followed by value bytes
    data: Box<[u8]>,
}

impl Entry {
    /// Snapshot `key` and `value` into a fresh entry (clock bit set)
    pub(crate) fn build(
        hash: KeyHash,
        key: &[u8],
        value: &[u8],
        expires_at: i64,
    ) -> CacheResult<Arc<Self>> {
        let key_len = u32::try_from(key.len()).map_err(|_| CacheError::KeyTooLarge(key.len()))?;
        u32::try_from(value.len()).map_err(|_| CacheError::ValueTooLarge(value.len()))?;

        let total = key.len() + value.len();
        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| CacheError::OutOfMemory(total + std::mem::size_of::<Entry>()))?;
        data.extend_from_slice(key);
        data.extend_from_slice(value);

        Ok(Arc::new(Self {
            clock_bit: AtomicBool::new(true),
            expires_at,
            hash,
            key_len,
            data: data.into_boxed_slice(),
        }))
    }

    #[inline(always)]
    pub(crate) fn key(&self) -> &[u8] {
        &self.data[..self.key_len as usize]
    }

    #[inline(always)]
    pub(crate) fn value(&self) -> &[u8] {
        &self.data[self.key_len as usize..]
    }

    #[inline(always)]
    pub(crate) fn hash(&self) -> KeyHash {
        self.hash
    }

    #[inline(always)]
    pub(crate) fn key_len(&self) -> u32 {
        self.key_len
    }

    #[inline(always)]
    pub(crate) fn expires_at(&self) -> i64 {
        self.expires_at
    }

    #[inline(always)]
    pub(crate) fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Mark recently used; safe under a shard read lock
    #[inline(always)]
    pub(crate) fn touch(&self) {
        self.clock_bit.store(true, Ordering::Relaxed);
    }

    /// Clear the reference bit, returning its previous value
    #[inline(always)]
    pub(crate) fn take_clock_bit(&self) -> bool {
        self.clock_bit.swap(false, Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn clock_bit(&self) -> bool {
        self.clock_bit.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &String::from_utf8_lossy(self.key()))
            .field("value_len", &self.value().len())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Zero-copy handle to a cached value
///
/// Dereferences to the value bytes stored inside the entry. Dropping the
/// handle (or calling [`CacheRef::release`]) gives up this reference; the
/// entry is freed once the table and every handle have let go.
///
/// # Example
///
/// ```ignore
/// if let Some(value) = cache.get(b"user:42") {
///     send(&value);
///     value.release();
/// }
/// ```
#[derive(Clone)]
pub struct CacheRef {
    entry: Arc<Entry>,
}

impl CacheRef {
    #[inline]
    pub(crate) fn new(entry: Arc<Entry>) -> Self {
        Self { entry }
    }

    /// Value bytes
    #[inline(always)]
    pub fn value(&self) -> &[u8] {
        self.entry.value()
    }

    /// Key bytes this value was stored under
    #[inline]
    pub fn key(&self) -> &[u8] {
        self.entry.key()
    }

    /// Expiry instant, `None` if the entry never expires
    pub fn expires_at(&self) -> Option<SystemTime> {
        match self.entry.expires_at() {
            NEVER_EXPIRES => None,
            ms => Some(UNIX_EPOCH + Duration::from_millis(u64::try_from(ms).unwrap_or(0))),
        }
    }

    /// Outstanding references to the entry, the table's included
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.entry)
    }

    /// Give up this reference
    #[inline]
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for CacheRef {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        self.entry.value()
    }
}

impl AsRef<[u8]> for CacheRef {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        self.entry.value()
    }
}

impl fmt::Debug for CacheRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRef")
            .field("entry", &self.entry)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}
