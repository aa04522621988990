/*!
 * System Pages
 * Page-aligned, zero-initialized regions requested directly from the OS
 *
 * On Unix this is an anonymous private mapping; elsewhere it falls back to
 * a page-aligned zeroed allocation from the global allocator.
 */

use crate::core::errors::{ArenaError, ArenaResult};
use crate::core::limits::FALLBACK_PAGE_SIZE;
use std::ptr::NonNull;
use std::sync::OnceLock;
use tracing::{trace, warn};

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// OS page size, queried once
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(detect_page_size)
}

#[cfg(unix)]
fn detect_page_size() -> usize {
    use nix::unistd::{sysconf, SysconfVar};

    match sysconf(SysconfVar::PAGE_SIZE) {
        Ok(Some(size)) if size > 0 && (size as usize).is_power_of_two() => size as usize,
        _ => {
            warn!(
                fallback = FALLBACK_PAGE_SIZE,
                "Failed to query page size, using fallback"
            );
            FALLBACK_PAGE_SIZE
        }
    }
}

#[cfg(not(unix))]
fn detect_page_size() -> usize {
    FALLBACK_PAGE_SIZE
}

/// Round `size` up to a whole number of pages
#[inline]
pub fn round_to_pages(size: usize) -> Option<usize> {
    let mask = page_size() - 1;
    size.checked_add(mask).map(|s| s & !mask)
}

/// Request `size` bytes of read/write, zero-initialized memory from the OS
///
/// Returns `None` when `size` is zero or the OS refuses the request.
/// The region must be released with [`system_free`] using the same `size`.
pub fn system_alloc(size: usize) -> Option<NonNull<u8>> {
    if size == 0 {
        return None;
    }

    let ptr = os_map(size);
    match ptr {
        Some(p) => trace!(address = ?p, size_bytes = size, "Mapped pages"),
        None => warn!(size_bytes = size, "OS refused page mapping"),
    }
    ptr
}

/// Release a region obtained from [`system_alloc`]
///
/// # Safety
///
/// `ptr` must come from `system_alloc(size)` with the same `size`, and no
/// reference into the region may outlive this call.
pub unsafe fn system_free(ptr: NonNull<u8>, size: usize) {
    trace!(address = ?ptr, size_bytes = size, "Unmapping pages");
    // SAFETY: forwarded caller contract
    unsafe { os_unmap(ptr, size) }
}

#[cfg(unix)]
fn os_map(size: usize) -> Option<NonNull<u8>> {
    use nix::sys::mman::{mmap_anonymous, MapFlags, ProtFlags};
    use std::num::NonZeroUsize;

    let length = NonZeroUsize::new(size)?;
    // SAFETY: anonymous mapping with no fixed address cannot alias existing memory
    let mapped = unsafe {
        mmap_anonymous(
            None,
            length,
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
            MapFlags::MAP_PRIVATE,
        )
    };
    mapped.ok().map(|p| p.cast::<u8>())
}

#[cfg(unix)]
unsafe fn os_unmap(ptr: NonNull<u8>, size: usize) {
    // SAFETY: caller guarantees (ptr, size) describes a live mapping
    if let Err(e) = unsafe { nix::sys::mman::munmap(ptr.cast(), size) } {
        warn!(address = ?ptr, size_bytes = size, error = %e, "munmap failed");
    }
}

#[cfg(not(unix))]
fn os_map(size: usize) -> Option<NonNull<u8>> {
    use std::alloc::{alloc_zeroed, Layout};

    let layout = Layout::from_size_align(size, page_size()).ok()?;
    // SAFETY: layout has non-zero size
    NonNull::new(unsafe { alloc_zeroed(layout) })
}

#[cfg(not(unix))]
unsafe fn os_unmap(ptr: NonNull<u8>, size: usize) {
    use std::alloc::{dealloc, Layout};

    // SAFETY: same layout as os_map, which already validated it
    unsafe {
        let layout = Layout::from_size_align_unchecked(size, page_size());
        dealloc(ptr.as_ptr(), layout);
    }
}

/// Owned page region, unmapped on drop
#[derive(Debug)]
pub struct PageRegion {
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: the region is exclusively owned; moving it between threads is fine
unsafe impl Send for PageRegion {}
// SAFETY: shared access only hands out the base pointer and length
unsafe impl Sync for PageRegion {}

impl PageRegion {
    /// Map at least `size` bytes, rounded up to whole pages
    pub fn map(size: usize) -> ArenaResult<Self> {
        let len = round_to_pages(size.max(1)).ok_or(ArenaError::SizeOverflow(size))?;
        let ptr = system_alloc(len).ok_or(ArenaError::OutOfMemory { requested: len })?;
        Ok(Self { ptr, len })
    }

    /// Base address of the region
    #[inline(always)]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Length in bytes (a multiple of the page size)
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Regions are never empty, kept for API symmetry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether `addr` falls inside the region
    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        let base = self.ptr.as_ptr() as usize;
        addr >= base && addr < base + self.len
    }
}

impl Drop for PageRegion {
    fn drop(&mut self) {
        // SAFETY: (ptr, len) came from system_alloc in PageRegion::map
        unsafe { system_free(self.ptr, self.len) }
    }
}
