/*!
 * Chunk Pooling
 * Reuses released arena chunks instead of unmapping and remapping them
 */

use super::pages::{round_to_pages, PageRegion};
use crate::core::errors::ArenaResult;
use crate::core::limits::{CHUNK_POOL_DEPTH, DEFAULT_CHUNK_SIZE};
use crossbeam_queue::ArrayQueue;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing::debug;

static GLOBAL_POOL: OnceLock<ChunkPool> = OnceLock::new();

/// Process-wide pool of page regions of a single size
///
/// # Performance
///
/// - **Reset churn**: `Arena::reset` hands chunks back here, the next growth
///   pops them without a syscall
/// - **Lock-free**: backed by a bounded `ArrayQueue`
/// - **Bounded**: at most `CHUNK_POOL_DEPTH` regions are retained
///
/// Recycled regions are not re-zeroed.
pub struct ChunkPool {
    regions: ArrayQueue<PageRegion>,
    region_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    returns: AtomicU64,
    discards: AtomicU64,
}

impl ChunkPool {
    /// Create a pool for regions of `region_size` bytes (rounded to pages)
    pub fn new(region_size: usize, depth: usize) -> Self {
        Self {
            regions: ArrayQueue::new(depth.max(1)),
            region_size: round_to_pages(region_size).unwrap_or(region_size),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            discards: AtomicU64::new(0),
        }
    }

    /// Pool shared by every pooled arena, sized for `DEFAULT_CHUNK_SIZE`
    pub fn global() -> &'static ChunkPool {
        GLOBAL_POOL.get_or_init(|| ChunkPool::new(DEFAULT_CHUNK_SIZE, CHUNK_POOL_DEPTH))
    }

    /// Size of the regions this pool holds
    #[inline]
    pub fn region_size(&self) -> usize {
        self.region_size
    }

    /// Whether a request of `size` bytes would be served by this pool
    #[inline]
    pub fn serves(&self, size: usize) -> bool {
        round_to_pages(size) == Some(self.region_size)
    }

    /// Pop a pooled region or map a fresh one
    pub fn acquire(&self) -> ArenaResult<PageRegion> {
        if let Some(region) = self.regions.pop() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(size_bytes = self.region_size, "Reusing pooled chunk");
            return Ok(region);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        PageRegion::map(self.region_size)
    }

    /// Return a region; it is unmapped if the pool is full or the size differs
    pub fn release(&self, region: PageRegion) {
        if region.len() != self.region_size {
            self.discards.fetch_add(1, Ordering::Relaxed);
            return;
        }

        match self.regions.push(region) {
            Ok(()) => {
                self.returns.fetch_add(1, Ordering::Relaxed);
            }
            Err(_full) => {
                // Dropping the rejected region unmaps it
                self.discards.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of regions currently pooled
    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check if no region is pooled
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Get pool statistics
    pub fn stats(&self) -> ChunkPoolStats {
        ChunkPoolStats {
            region_size: self.region_size,
            pooled: self.regions.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            returns: self.returns.load(Ordering::Relaxed),
            discards: self.discards.load(Ordering::Relaxed),
        }
    }
}

/// Chunk pool statistics
#[derive(Debug, Clone, Serialize)]
pub struct ChunkPoolStats {
    pub region_size: usize,
    pub pooled: usize,
    pub hits: u64,
    pub misses: u64,
    pub returns: u64,
    pub discards: u64,
}
