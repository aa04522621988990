/*!
 * Packed Slot Metadata
 *
 * One 64-bit word per bucket: high 32 bits hash, low 32 bits key length.
 * Hash 0 marks an empty slot and hash 1 a tombstone, so a probe classifies
 * and prefilters a bucket with a single load and compare.
 */

use super::hash::KeyHash;

const EMPTY_HASH: u32 = 0;
const TOMBSTONE_HASH: u32 = 1;

/// Decoded slot state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    Empty,
    Tombstone,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct SlotMeta(u64);

impl SlotMeta {
    pub(crate) const EMPTY: SlotMeta = SlotMeta((EMPTY_HASH as u64) << 32);
    pub(crate) const TOMBSTONE: SlotMeta = SlotMeta((TOMBSTONE_HASH as u64) << 32);

    #[inline(always)]
    pub(crate) fn pack(hash: KeyHash, key_len: u32) -> Self {
        SlotMeta((u64::from(hash.get()) << 32) | u64::from(key_len))
    }

    #[inline(always)]
    pub(crate) fn hash(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline(always)]
    pub(crate) fn key_len(self) -> u32 {
        self.0 as u32
    }

    #[inline(always)]
    pub(crate) fn state(self) -> SlotState {
        match self.hash() {
            EMPTY_HASH => SlotState::Empty,
            TOMBSTONE_HASH => SlotState::Tombstone,
            _ => SlotState::Live,
        }
    }

    #[inline(always)]
    pub(crate) fn is_live(self) -> bool {
        self.hash() > TOMBSTONE_HASH
    }
}
