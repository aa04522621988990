/*!
 * Key Hashing
 * FNV-1a over key bytes, remapped away from the reserved slot markers
 */

use crate::core::limits::SHARD_COUNT;

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Hash values below this are reserved (0 = empty slot, 1 = tombstone)
pub(crate) const FIRST_REAL_HASH: u32 = 2;

/// Bits of the hash consumed by shard selection
pub(crate) const SHARD_BITS: u32 = SHARD_COUNT.trailing_zeros();

/// 32-bit key hash, always `>= 2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHash(u32);

impl KeyHash {
    /// Hash key bytes with FNV-1a
    #[inline]
    pub fn of(key: &[u8]) -> Self {
        let mut hash = FNV_OFFSET_BASIS;
        for &byte in key {
            hash ^= u32::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self::from_raw(hash)
    }

    /// Wrap a raw hash, shifting reserved values upward
    #[inline(always)]
    pub fn from_raw(hash: u32) -> Self {
        if hash < FIRST_REAL_HASH {
            Self(hash + FIRST_REAL_HASH)
        } else {
            Self(hash)
        }
    }

    #[inline(always)]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Shard owning this hash
    #[inline(always)]
    pub fn shard_index(self) -> usize {
        (self.0 as usize) & (SHARD_COUNT - 1)
    }

    /// Home bucket inside a shard
    ///
    /// Skips the shard-selection bits; every key of a shard shares them.
    #[inline(always)]
    pub fn bucket_index(self, mask: usize) -> usize {
        ((self.0 >> SHARD_BITS) as usize) & mask
    }
}
