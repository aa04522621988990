/*!
 * Arena Allocation
 * Chunked bump allocation over OS pages with in-place resize of the newest block
 */

use super::pages::PageRegion;
use super::pool::ChunkPool;
use crate::core::errors::{ArenaError, ArenaResult};
use crate::core::hints::{likely, unlikely};
use crate::core::limits::{ARENA_ALIGN, ARENA_HEADER_SIZE, DEFAULT_CHUNK_SIZE};
use parking_lot::Mutex;
use serde::Serialize;
use std::ptr::NonNull;
use tracing::{debug, warn};

#[inline(always)]
fn align_up(n: usize) -> Option<usize> {
    n.checked_add(ARENA_ALIGN - 1).map(|v| v & !(ARENA_ALIGN - 1))
}

/// Header bytes plus the aligned payload for a request of `size`
#[inline(always)]
fn block_size(size: usize) -> ArenaResult<usize> {
    align_up(size)
        .and_then(|padded| padded.checked_add(ARENA_HEADER_SIZE))
        .ok_or(ArenaError::SizeOverflow(size))
}

/// Read the requested size stored in front of a user pointer
///
/// # Safety
/// `user` must have been returned by an arena that is still alive.
#[inline(always)]
unsafe fn read_header(user: NonNull<u8>) -> usize {
    // SAFETY: the header sits ARENA_HEADER_SIZE bytes before the user pointer
    // and is ARENA_ALIGN aligned, which satisfies usize alignment
    unsafe { user.as_ptr().sub(ARENA_HEADER_SIZE).cast::<usize>().read() }
}

#[inline(always)]
unsafe fn write_header(user: NonNull<u8>, size: usize) {
    // SAFETY: see read_header
    unsafe { user.as_ptr().sub(ARENA_HEADER_SIZE).cast::<usize>().write(size) }
}

/// One contiguous page region, its high-water mark and its block starts
struct Chunk {
    region: PageRegion,
    used: usize,
    /// Offsets of every user pointer handed out, ascending
    starts: Vec<usize>,
}

impl Chunk {
    fn new(region: PageRegion) -> Self {
        Self {
            region,
            used: 0,
            starts: Vec::new(),
        }
    }

    #[inline(always)]
    fn base(&self) -> usize {
        self.region.as_ptr() as usize
    }

    #[inline(always)]
    fn size(&self) -> usize {
        self.region.len()
    }

    #[inline(always)]
    fn remaining(&self) -> usize {
        self.size() - self.used
    }

    /// A user pointer belongs here iff `base + header <= p <= base + used`
    #[inline]
    fn owns(&self, addr: usize) -> bool {
        let base = self.base();
        addr >= base + ARENA_HEADER_SIZE && addr <= base + self.used
    }

    /// Whether `addr` is exactly a user pointer returned by this chunk
    #[inline]
    fn is_block_start(&self, addr: usize) -> bool {
        self.owns(addr) && self.starts.binary_search(&(addr - self.base())).is_ok()
    }

    /// Carve `total` bytes off the tail; caller checked `remaining() >= total`
    #[inline(always)]
    fn bump(&mut self, size: usize, total: usize) -> ArenaResult<NonNull<u8>> {
        debug_assert!(total <= self.remaining());
        self.starts
            .try_reserve(1)
            .map_err(|_| ArenaError::OutOfMemory { requested: total })?;

        // SAFETY: used + total <= size, so both pointers stay inside the region
        let user = unsafe {
            let header = self.region.as_ptr().add(self.used);
            NonNull::new_unchecked(header.add(ARENA_HEADER_SIZE))
        };
        // SAFETY: header slot lies inside the region and is aligned
        unsafe { write_header(user, size) };
        self.starts.push(self.used + ARENA_HEADER_SIZE);
        self.used += total;
        Ok(user)
    }

    fn clear(&mut self) {
        self.used = 0;
        self.starts.clear();
    }
}

/// Chunk list; the last element is the head (current allocation target)
struct ArenaInner {
    chunks: Vec<Chunk>,
}

impl ArenaInner {
    #[inline(always)]
    fn head(&self) -> &Chunk {
        &self.chunks[self.chunks.len() - 1]
    }

    #[inline(always)]
    fn head_mut(&mut self) -> &mut Chunk {
        let idx = self.chunks.len() - 1;
        &mut self.chunks[idx]
    }

    /// Find the chunk owning `addr`, newest first
    fn find(&self, addr: usize) -> Option<&Chunk> {
        self.chunks.iter().rev().find(|chunk| chunk.owns(addr))
    }

    /// Find the chunk that handed out `addr` as a block start
    fn find_block_mut(&mut self, addr: usize) -> Option<&mut Chunk> {
        self.chunks
            .iter_mut()
            .rev()
            .find(|chunk| chunk.owns(addr))
            .filter(|chunk| chunk.is_block_start(addr))
    }

    fn find_block(&self, addr: usize) -> Option<&Chunk> {
        self.find(addr).filter(|chunk| chunk.is_block_start(addr))
    }
}

/// Arena configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArenaConfig {
    /// Minimum size of each chunk (0 selects `DEFAULT_CHUNK_SIZE`)
    pub chunk_size: usize,
    /// Route default-sized chunks through the global chunk pool
    pub pooled: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pooled: true,
        }
    }
}

impl ArenaConfig {
    /// Configuration with a custom chunk size
    pub const fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            pooled: true,
        }
    }

    /// Always map and unmap chunks directly
    pub const fn unpooled(mut self) -> Self {
        self.pooled = false;
        self
    }

    fn normalized(mut self) -> Self {
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        self
    }
}

/// Arena usage snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArenaStats {
    pub chunk_count: usize,
    pub reserved_bytes: usize,
    pub used_bytes: usize,
    pub head_capacity: usize,
    pub head_used: usize,
}

fn acquire_region(pooled: bool, min_size: usize) -> ArenaResult<PageRegion> {
    let pool = ChunkPool::global();
    if pooled && pool.serves(min_size) {
        pool.acquire()
    } else {
        PageRegion::map(min_size)
    }
}

fn release_region(pooled: bool, region: PageRegion) {
    let pool = ChunkPool::global();
    if pooled && pool.serves(region.len()) {
        pool.release(region);
    }
}

/// Chunked bump allocator
///
/// # Performance
///
/// - **Allocation**: O(1), bumps the head chunk's high-water mark
/// - **Resize of the newest block**: O(1), in place
/// - **Deallocation**: none per block; `reset` or drop releases everything
///
/// Every returned pointer is `ARENA_ALIGN` aligned and preceded by a header
/// holding the exact requested size. All operations serialize on one mutex.
///
/// # Example
///
/// ```ignore
/// let arena = Arena::new(64 * 1024)?;
/// let greeting = arena.alloc_string("Hello")?;
/// let block = arena.alloc(256)?;
/// ```
pub struct Arena {
    inner: Mutex<ArenaInner>,
    config: ArenaConfig,
}

impl Arena {
    /// Create an arena; `chunk_size == 0` selects the default (1MB)
    pub fn new(chunk_size: usize) -> ArenaResult<Self> {
        Self::with_config(ArenaConfig::with_chunk_size(chunk_size))
    }

    /// Create an arena from a full configuration
    pub fn with_config(config: ArenaConfig) -> ArenaResult<Self> {
        let config = config.normalized();
        let region = acquire_region(config.pooled, config.chunk_size)?;

        debug!(
            chunk_size = config.chunk_size,
            mapped = region.len(),
            pooled = config.pooled,
            "Arena created"
        );

        Ok(Self {
            inner: Mutex::new(ArenaInner {
                chunks: vec![Chunk::new(region)],
            }),
            config,
        })
    }

    /// Effective configuration
    #[inline]
    pub fn config(&self) -> ArenaConfig {
        self.config
    }

    /// Allocate `size` bytes, aligned to `ARENA_ALIGN`
    ///
    /// The memory is not guaranteed to be zeroed. On head-chunk overflow a new
    /// chunk of `max(chunk_size, header + size)` bytes becomes the head.
    pub fn alloc(&self, size: usize) -> ArenaResult<NonNull<u8>> {
        let total = block_size(size)?;
        let mut inner = self.inner.lock();
        self.alloc_locked(&mut inner, size, total)
    }

    #[inline]
    fn alloc_locked(
        &self,
        inner: &mut ArenaInner,
        size: usize,
        total: usize,
    ) -> ArenaResult<NonNull<u8>> {
        if unlikely(inner.head().remaining() < total) {
            self.grow(inner, total)?;
        }
        inner.head_mut().bump(size, total)
    }

    #[cold]
    fn grow(&self, inner: &mut ArenaInner, total: usize) -> ArenaResult<()> {
        let want = self.config.chunk_size.max(total);
        let region = acquire_region(self.config.pooled, want).map_err(|e| {
            warn!(requested = want, error = %e, "Arena chunk allocation failed");
            e
        })?;

        debug!(
            chunk_bytes = region.len(),
            chunk_count = inner.chunks.len() + 1,
            "Arena grew new head chunk"
        );

        inner.chunks.push(Chunk::new(region));
        Ok(())
    }

    /// Resize an allocation
    ///
    /// 1. `ptr == None` behaves like [`Arena::alloc`].
    /// 2. If `ptr` is the newest block of its chunk and the new size fits,
    ///    it is resized in place and returned unchanged. A shrink to
    ///    `size >= 2` re-terminates the block with a NUL at `size - 1`.
    /// 3. Otherwise a new block is allocated and `min(old, new)` bytes are
    ///    copied. The old block stays valid until reset.
    ///
    /// A `ptr` that is not a block start handed out by this arena since its
    /// last reset (foreign, interior or misaligned) fails with
    /// `ForeignPointer` without touching memory.
    ///
    /// # Safety
    ///
    /// `ptr` must not be aliased by a live reference: the in-place path may
    /// write its last byte and the copy path reads it.
    pub unsafe fn realloc(&self, ptr: Option<NonNull<u8>>, size: usize) -> ArenaResult<NonNull<u8>> {
        let Some(ptr) = ptr else {
            return self.alloc(size);
        };

        let new_total = block_size(size)?;
        let new_padded = new_total - ARENA_HEADER_SIZE;
        let addr = ptr.as_ptr() as usize;
        let mut inner = self.inner.lock();

        let old_size = {
            let chunk = inner
                .find_block_mut(addr)
                .ok_or(ArenaError::ForeignPointer(addr))?;
            // SAFETY: addr is a recorded block start, so its header precedes it
            let old_size = unsafe { read_header(ptr) };
            let offset = addr - chunk.base();
            let old_end = align_up(old_size)
                .and_then(|padded| offset.checked_add(padded))
                .ok_or(ArenaError::ForeignPointer(addr))?;

            if unlikely(old_end > chunk.used) {
                return Err(ArenaError::ForeignPointer(addr));
            }

            if old_end == chunk.used && likely(offset + new_padded <= chunk.size()) {
                chunk.used = offset + new_padded;
                // SAFETY: the block now spans `size` bytes inside the chunk
                unsafe {
                    write_header(ptr, size);
                    if size < old_size && size >= 2 {
                        ptr.as_ptr().add(size - 1).write(0);
                    }
                }
                return Ok(ptr);
            }

            old_size
        };

        let fresh = self.alloc_locked(&mut inner, size, new_total)?;
        // SAFETY: both blocks are live, distinct and at least min(old, new) long
        unsafe {
            std::ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), old_size.min(size));
        }
        Ok(fresh)
    }

    /// Copy a string into the arena, NUL-terminated
    ///
    /// The header records `s.len() + 1`; the returned slice excludes the NUL.
    pub fn alloc_string(&self, s: &str) -> ArenaResult<&str> {
        let len = s.len();
        let ptr = self.alloc(len + 1)?;
        // SAFETY: fresh block of len + 1 bytes owned by this arena
        unsafe {
            std::ptr::copy_nonoverlapping(s.as_ptr(), ptr.as_ptr(), len);
            ptr.as_ptr().add(len).write(0);
            let bytes = std::slice::from_raw_parts(ptr.as_ptr(), len);
            Ok(std::str::from_utf8_unchecked(bytes))
        }
    }

    /// Copy bytes into the arena
    pub fn alloc_bytes(&self, bytes: &[u8]) -> ArenaResult<&mut [u8]> {
        let ptr = self.alloc(bytes.len())?;
        // SAFETY: fresh block of bytes.len() bytes, disjoint from all others
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len());
            Ok(std::slice::from_raw_parts_mut(ptr.as_ptr(), bytes.len()))
        }
    }

    /// Allocate and initialize an integer
    pub fn alloc_int(&self, n: i64) -> ArenaResult<&mut i64> {
        let ptr = self.alloc(std::mem::size_of::<i64>())?.cast::<i64>();
        // SAFETY: ARENA_ALIGN >= align_of::<i64>() and the block is fresh
        unsafe {
            ptr.as_ptr().write(n);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Requested size recorded for a block returned by this arena
    ///
    /// Pointers that are not a block start (interior, misaligned or from
    /// elsewhere) give `ForeignPointer`.
    pub fn allocation_size(&self, ptr: NonNull<u8>) -> ArenaResult<usize> {
        let addr = ptr.as_ptr() as usize;
        let inner = self.inner.lock();
        inner
            .find_block(addr)
            // SAFETY: addr is a recorded block start, so its header precedes it
            .map(|_| unsafe { read_header(ptr) })
            .ok_or(ArenaError::ForeignPointer(addr))
    }

    /// Check whether `ptr` points into a live block of this arena
    pub fn owns(&self, ptr: *const u8) -> bool {
        self.inner.lock().find(ptr as usize).is_some()
    }

    /// Keep the head chunk (emptied), release every other chunk
    ///
    /// Taking `&mut self` guarantees no slice handed out earlier is still
    /// borrowed.
    pub fn reset(&mut self) {
        let pooled = self.config.pooled;
        let inner = self.inner.get_mut();
        let head_idx = inner.chunks.len() - 1;
        let released = head_idx;

        for chunk in inner.chunks.drain(..head_idx) {
            release_region(pooled, chunk.region);
        }
        inner.head_mut().clear();

        debug!(released_chunks = released, "Arena reset");
    }

    /// Release every chunk; equivalent to dropping the arena
    pub fn destroy(self) {
        drop(self);
    }

    /// Get arena statistics
    pub fn stats(&self) -> ArenaStats {
        let inner = self.inner.lock();
        let head = inner.head();
        ArenaStats {
            chunk_count: inner.chunks.len(),
            reserved_bytes: inner.chunks.iter().map(Chunk::size).sum(),
            used_bytes: inner.chunks.iter().map(|c| c.used).sum(),
            head_capacity: head.size(),
            head_used: head.used,
        }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        let pooled = self.config.pooled;
        let inner = self.inner.get_mut();
        for chunk in inner.chunks.drain(..) {
            release_region(pooled, chunk.region);
        }
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
