/*!
 * Cache Shard
 *
 * Open-addressed table with linear probing, packed slot metadata and CLOCK
 * (second-chance) eviction, guarded by one reader-writer lock.
 *
 * Slot lifecycle: EMPTY -> LIVE on insert, LIVE -> LIVE on update,
 * LIVE -> TOMBSTONE on invalidate/evict/expire, TOMBSTONE -> LIVE on insert.
 * Probes stop only at EMPTY slots.
 */

use super::entry::{CacheRef, Entry};
use super::hash::KeyHash;
use super::slot::{SlotMeta, SlotState};
use super::types::ShardStats;
use crate::core::hints::{likely, unlikely};
use crate::core::limits::CACHE_LOAD_FACTOR;
use crate::core::sync::ShardLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// Live slot holding the key
    Found(usize),
    /// Slot to insert into (first tombstone on the path, else the empty slot)
    Vacant(usize),
    /// Every slot is live and none matches
    Full,
}

pub(crate) struct Table {
    meta: Box<[SlotMeta]>,
    entries: Box<[Option<Arc<Entry>>]>,
    size: usize,
    tombstones: usize,
    clock_hand: usize,
}

impl Table {
    pub(crate) fn new(bucket_count: usize) -> Self {
        debug_assert!(bucket_count.is_power_of_two());
        Self {
            meta: vec![SlotMeta::EMPTY; bucket_count].into_boxed_slice(),
            entries: (0..bucket_count).map(|_| None).collect(),
            size: 0,
            tombstones: 0,
            clock_hand: 0,
        }
    }

    #[inline(always)]
    fn bucket_count(&self) -> usize {
        self.meta.len()
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.meta.len() - 1
    }

    #[inline(always)]
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Linear probe for `key`
    ///
    /// A packed-metadata match is only a prefilter: key bytes are compared and
    /// probing continues past hash collisions.
    fn probe(&self, hash: KeyHash, key: &[u8]) -> Probe {
        let mask = self.mask();
        let target = SlotMeta::pack(hash, key.len() as u32);
        let mut idx = hash.bucket_index(mask);
        let mut first_tombstone = None;

        for _ in 0..self.bucket_count() {
            let meta = self.meta[idx];
            match meta.state() {
                SlotState::Empty => return Probe::Vacant(first_tombstone.unwrap_or(idx)),
                SlotState::Tombstone => {
                    first_tombstone.get_or_insert(idx);
                }
                SlotState::Live => {
                    if meta == target {
                        if let Some(entry) = &self.entries[idx] {
                            if likely(entry.key() == key) {
                                return Probe::Found(idx);
                            }
                        }
                    }
                }
            }
            idx = (idx + 1) & mask;
        }

        first_tombstone.map_or(Probe::Full, Probe::Vacant)
    }

    fn lookup(&self, hash: KeyHash, key: &[u8]) -> Option<&Arc<Entry>> {
        match self.probe(hash, key) {
            Probe::Found(idx) => self.entries[idx].as_ref(),
            _ => None,
        }
    }

    /// Tombstone a live slot and hand back the table's reference
    fn remove_at(&mut self, idx: usize) -> Option<Arc<Entry>> {
        debug_assert!(self.meta[idx].is_live());
        self.meta[idx] = SlotMeta::TOMBSTONE;
        self.size -= 1;
        self.tombstones += 1;
        self.entries[idx].take()
    }

    fn install(&mut self, idx: usize, entry: Arc<Entry>) {
        match self.meta[idx].state() {
            SlotState::Tombstone => self.tombstones -= 1,
            SlotState::Empty => {}
            SlotState::Live => unreachable!("install into live slot"),
        }
        self.meta[idx] = SlotMeta::pack(entry.hash(), entry.key_len());
        self.entries[idx] = Some(entry);
        self.size += 1;
    }

    /// CLOCK second-chance eviction
    ///
    /// Sweeps at most `2 * bucket_count` slots from the hand, clearing
    /// reference bits; the first live slot found with its bit already clear is
    /// evicted. If the sweep finds none, the next live slot at or after the
    /// hand is evicted unconditionally. Returns the victim and whether the
    /// fallback was used.
    fn evict_one(&mut self) -> Option<(Arc<Entry>, bool)> {
        if self.size == 0 {
            return None;
        }

        let mask = self.mask();
        for _ in 0..2 * self.bucket_count() {
            let idx = self.clock_hand;
            self.clock_hand = (idx + 1) & mask;

            if !self.meta[idx].is_live() {
                continue;
            }
            let referenced = self.entries[idx]
                .as_ref()
                .map_or(false, |entry| entry.take_clock_bit());
            if !referenced {
                return self.remove_at(idx).map(|victim| (victim, false));
            }
        }

        for _ in 0..self.bucket_count() {
            let idx = self.clock_hand;
            self.clock_hand = (idx + 1) & mask;
            if self.meta[idx].is_live() {
                return self.remove_at(idx).map(|victim| (victim, true));
            }
        }

        None
    }

    /// Rehash live entries into a table without tombstones
    fn rebuild(&mut self) {
        let mut fresh = Table::new(self.bucket_count());
        for entry in self.entries.iter_mut().filter_map(Option::take) {
            match fresh.probe(entry.hash(), entry.key()) {
                Probe::Vacant(idx) => fresh.install(idx, entry),
                Probe::Found(_) | Probe::Full => unreachable!("rebuild target cannot be full"),
            }
        }
        *self = fresh;
    }

    fn live_entries(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.entries.iter().flatten()
    }
}

/// Outcome of a shard insert
pub(crate) struct InsertOutcome {
    pub(crate) replaced: bool,
    pub(crate) evicted: Option<Arc<Entry>>,
}

/// Outcome of a shard lookup
pub(crate) enum Lookup {
    Hit(CacheRef),
    Miss,
    Expired(Arc<Entry>),
}

/// One independent partition of the cache
///
/// # Performance
/// Cache-line aligned so neighbouring shards' locks and counters never share
/// a line.
#[repr(C, align(64))]
pub(crate) struct Shard {
    table: ShardLock<Table>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    forced_evictions: AtomicU64,
    expirations: AtomicU64,
}

impl Shard {
    /// Shard holding up to `capacity` entries in
    /// `next_pow2(capacity * CACHE_LOAD_FACTOR)` buckets
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let buckets = capacity
            .saturating_mul(CACHE_LOAD_FACTOR)
            .checked_next_power_of_two()
            .unwrap_or(1 << (usize::BITS - 1));

        Self {
            table: ShardLock::new(Table::new(buckets)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            forced_evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn size(&self) -> usize {
        self.table.read().size()
    }

    /// Insert or replace under the write lock
    ///
    /// Replacing an existing key never evicts. A new key evicts one entry
    /// first when the shard is at capacity.
    pub(crate) fn insert(&self, entry: Arc<Entry>) -> InsertOutcome {
        let mut table = self.table.write();

        if unlikely(table.tombstones > table.bucket_count() / 2) {
            trace!(tombstones = table.tombstones, "Rebuilding shard table");
            table.rebuild();
        }

        let mut evicted = None;
        let mut probe = table.probe(entry.hash(), entry.key());

        if let Probe::Found(idx) = probe {
            // Same key, so the packed metadata is unchanged
            let old = table.entries[idx].replace(entry);
            drop(table);
            drop(old);
            return InsertOutcome {
                replaced: true,
                evicted: None,
            };
        }

        if table.size >= self.capacity || probe == Probe::Full {
            if let Some((victim, forced)) = table.evict_one() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                if forced {
                    self.forced_evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(key_len = victim.key_len(), "Forced CLOCK eviction");
                } else {
                    trace!(key_len = victim.key_len(), "CLOCK eviction");
                }
                evicted = Some(victim);
            }
            if probe == Probe::Full {
                probe = table.probe(entry.hash(), entry.key());
            }
        }

        match probe {
            Probe::Vacant(idx) => table.install(idx, entry),
            Probe::Found(_) | Probe::Full => unreachable!("eviction frees a slot"),
        }
        debug_assert!(table.size <= self.capacity);

        InsertOutcome {
            replaced: false,
            evicted,
        }
    }

    /// Zero-copy lookup under the read lock
    pub(crate) fn get(&self, hash: KeyHash, key: &[u8], now: i64) -> Lookup {
        let table = self.table.read();
        let Some(entry) = table.lookup(hash, key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Lookup::Miss;
        };

        if unlikely(entry.is_expired(now)) {
            let expired = Arc::clone(entry);
            drop(table);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Lookup::Expired(expired);
        }

        entry.touch();
        let handle = CacheRef::new(Arc::clone(entry));
        drop(table);
        self.hits.fetch_add(1, Ordering::Relaxed);
        Lookup::Hit(handle)
    }

    /// Check presence without touching the reference bit or counters
    pub(crate) fn contains(&self, hash: KeyHash, key: &[u8], now: i64) -> bool {
        self.table
            .read()
            .lookup(hash, key)
            .map_or(false, |entry| !entry.is_expired(now))
    }

    /// Tombstone `key`; returns the table's reference if it was present
    pub(crate) fn remove(&self, hash: KeyHash, key: &[u8]) -> Option<Arc<Entry>> {
        let mut table = self.table.write();
        match table.probe(hash, key) {
            Probe::Found(idx) => table.remove_at(idx),
            _ => None,
        }
    }

    /// Tombstone `key` only if it still maps to `expected`
    ///
    /// Used after a read-locked lookup saw `expected` expired; a concurrent
    /// `set` that replaced it in between must survive.
    pub(crate) fn remove_expired(&self, expected: &Arc<Entry>) -> bool {
        let mut table = self.table.write();
        let removed = match table.probe(expected.hash(), expected.key()) {
            Probe::Found(idx) => {
                let same = table.entries[idx]
                    .as_ref()
                    .map_or(false, |current| Arc::ptr_eq(current, expected));
                same && table.remove_at(idx).is_some()
            }
            _ => false,
        };
        drop(table);

        if removed {
            self.expirations.fetch_add(1, Ordering::Relaxed);
            trace!(key_len = expected.key_len(), "Expired entry invalidated");
        }
        removed
    }

    /// Tombstone every expired entry; returns how many were dropped
    pub(crate) fn purge_expired(&self, now: i64) -> usize {
        let mut table = self.table.write();
        let expired: Vec<usize> = (0..table.bucket_count())
            .filter(|&idx| {
                table.entries[idx]
                    .as_ref()
                    .map_or(false, |entry| entry.is_expired(now))
            })
            .collect();

        let removed: Vec<_> = expired
            .into_iter()
            .filter_map(|idx| table.remove_at(idx))
            .collect();
        drop(table);

        self.expirations
            .fetch_add(removed.len() as u64, Ordering::Relaxed);
        removed.len()
    }

    /// Tombstone every live slot; returns how many entries were dropped
    pub(crate) fn clear(&self) -> usize {
        let mut table = self.table.write();
        let live: Vec<usize> = (0..table.bucket_count())
            .filter(|&idx| table.meta[idx].is_live())
            .collect();
        let dropped: Vec<_> = live
            .into_iter()
            .filter_map(|idx| table.remove_at(idx))
            .collect();
        drop(table);
        dropped.len()
    }

    /// Clone the table's references so they can be read without the lock
    pub(crate) fn snapshot(&self) -> Vec<Arc<Entry>> {
        self.table.read().live_entries().cloned().collect()
    }

    pub(crate) fn stats(&self, index: usize) -> ShardStats {
        let table = self.table.read();
        ShardStats {
            index,
            size: table.size,
            capacity: self.capacity,
            bucket_count: table.bucket_count(),
            tombstones: table.tombstones,
        }
    }

    pub(crate) fn counters(&self) -> [u64; 5] {
        [
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.evictions.load(Ordering::Relaxed),
            self.forced_evictions.load(Ordering::Relaxed),
            self.expirations.load(Ordering::Relaxed),
        ]
    }
}
