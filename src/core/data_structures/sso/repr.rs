/*!
 * SSO Representation
 * Inline/heap storage, capacity policy and the NUL-termination invariant
 */

use super::view::StrView;
use crate::core::errors::{StrError, StrResult};
use crate::core::limits::{SSO_GROWTH_FACTOR, SSO_INLINE_CAPACITY, SSO_MAX, SSO_MIN_HEAP_CAPACITY};
use std::ffi::CStr;

/// Storage of an [`SsoString`]
///
/// Both variants keep `buf[len] == 0` and `len < buf.len()`.
#[derive(Clone)]
pub(super) enum Repr {
    Inline {
        buf: [u8; SSO_INLINE_CAPACITY],
        len: u8,
    },
    Heap {
        buf: Box<[u8]>,
        len: usize,
    },
}

/// Byte string with small-string optimization
///
/// Strings up to [`SSO_MAX`] bytes live inline; longer ones move to a heap
/// buffer once and stay there. The buffer is always NUL-terminated, so
/// [`SsoString::as_c_str`] is free when the content has no interior NUL.
///
/// Content is treated as bytes. Case transforms only touch ASCII; other
/// bytes pass through unchanged.
///
/// # Performance
///
/// - **Inline** (<= 23 bytes): no allocation
/// - **Heap**: capacity grows from 32 by doubling, so appends are amortized O(1)
///
/// # Examples
///
/// ```ignore
/// let mut s = SsoString::from("HelloWorld");
/// assert!(!s.is_heap());
/// s.snake_case()?;
/// assert_eq!(s, "hello_world");
/// ```
#[derive(Clone)]
pub struct SsoString {
    pub(super) repr: Repr,
}

/// Smallest `SSO_MIN_HEAP_CAPACITY * SSO_GROWTH_FACTOR^k` that is `>= required`
pub(super) fn grown_capacity(required: usize) -> StrResult<usize> {
    let mut capacity = SSO_MIN_HEAP_CAPACITY;
    while capacity < required {
        capacity = capacity
            .checked_mul(SSO_GROWTH_FACTOR)
            .ok_or(StrError::OutOfMemory(required))?;
    }
    Ok(capacity)
}

/// Zeroed heap buffer, reporting allocation failure instead of aborting
fn zeroed_buffer(capacity: usize) -> StrResult<Box<[u8]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| StrError::OutOfMemory(capacity))?;
    buf.resize(capacity, 0);
    Ok(buf.into_boxed_slice())
}

/// Scratch vector for transforms that rebuild the content
pub(super) fn scratch(capacity: usize) -> StrResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| StrError::OutOfMemory(capacity))?;
    Ok(buf)
}

impl SsoString {
    /// Empty inline string
    #[inline]
    pub const fn new() -> Self {
        Self {
            repr: Repr::Inline {
                buf: [0; SSO_INLINE_CAPACITY],
                len: 0,
            },
        }
    }

    /// Empty string able to hold `capacity` bytes, NUL included
    ///
    /// Stays inline when `capacity <= SSO_INLINE_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> StrResult<Self> {
        if capacity <= SSO_INLINE_CAPACITY {
            return Ok(Self::new());
        }
        let buf = zeroed_buffer(grown_capacity(capacity)?)?;
        Ok(Self {
            repr: Repr::Heap { buf, len: 0 },
        })
    }

    /// Copy `bytes` into a new string
    pub fn from_bytes(bytes: &[u8]) -> StrResult<Self> {
        let required = bytes
            .len()
            .checked_add(1)
            .ok_or(StrError::OutOfMemory(usize::MAX))?;
        let mut s = Self::with_capacity(required)?;
        s.buffer_mut()[..bytes.len()].copy_from_slice(bytes);
        s.set_len(bytes.len());
        Ok(s)
    }

    /// Copy a C string (terminator excluded)
    pub fn from_c_str(s: &CStr) -> StrResult<Self> {
        Self::from_bytes(s.to_bytes())
    }

    /// Take ownership of `bytes`, reusing the allocation when it goes to the heap
    pub(super) fn from_vec(mut bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        if len <= SSO_MAX {
            let mut buf = [0; SSO_INLINE_CAPACITY];
            buf[..len].copy_from_slice(&bytes);
            return Self {
                repr: Repr::Inline {
                    buf,
                    len: len as u8,
                },
            };
        }

        let capacity = grown_capacity(len + 1).unwrap_or(len + 1);
        bytes.resize(capacity, 0);
        Self {
            repr: Repr::Heap {
                buf: bytes.into_boxed_slice(),
                len,
            },
        }
    }

    /// Length in bytes, NUL excluded
    #[inline(always)]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Inline { len, .. } => *len as usize,
            Repr::Heap { len, .. } => *len,
        }
    }

    /// Buffer size in bytes, NUL included
    #[inline]
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Inline { .. } => SSO_INLINE_CAPACITY,
            Repr::Heap { buf, .. } => buf.len(),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the content has moved to the heap (never reverts)
    #[inline]
    pub fn is_heap(&self) -> bool {
        matches!(self.repr, Repr::Heap { .. })
    }

    /// Content bytes
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Inline { buf, len } => &buf[..*len as usize],
            Repr::Heap { buf, len } => &buf[..*len],
        }
    }

    /// Content bytes followed by the terminating NUL
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        match &self.repr {
            Repr::Inline { buf, len } => &buf[..=*len as usize],
            Repr::Heap { buf, len } => &buf[..=*len],
        }
    }

    /// Mutable content bytes; the length cannot change through this slice
    #[inline]
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        let len = self.len();
        &mut self.buffer_mut()[..len]
    }

    /// Content as UTF-8, if valid
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Content as a C string, unless it contains an interior NUL
    pub fn as_c_str(&self) -> Option<&CStr> {
        CStr::from_bytes_with_nul(self.as_bytes_with_nul()).ok()
    }

    /// Byte at `index`
    #[inline]
    pub fn at(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    /// Borrowed view of the content
    #[inline]
    pub fn as_view(&self) -> StrView<'_> {
        StrView::new(self.as_bytes())
    }

    /// Whole buffer, NUL slot and spare capacity included
    #[inline(always)]
    pub(super) fn buffer_mut(&mut self) -> &mut [u8] {
        match &mut self.repr {
            Repr::Inline { buf, .. } => &mut buf[..],
            Repr::Heap { buf, .. } => &mut buf[..],
        }
    }

    /// Set the length and write the terminator
    #[inline]
    pub(super) fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len < self.capacity());
        match &mut self.repr {
            Repr::Inline { buf, len } => {
                buf[new_len] = 0;
                *len = new_len as u8;
            }
            Repr::Heap { buf, len } => {
                buf[new_len] = 0;
                *len = new_len;
            }
        }
    }

    /// Make room for `len` content bytes plus the terminator
    ///
    /// Inline content that no longer fits is promoted to the heap in one
    /// allocation. On error the string is unchanged.
    pub(super) fn ensure_len(&mut self, len: usize) -> StrResult<()> {
        let required = len.checked_add(1).ok_or(StrError::OutOfMemory(usize::MAX))?;
        if required <= self.capacity() {
            return Ok(());
        }

        let mut buf = zeroed_buffer(grown_capacity(required)?)?;
        let len = self.len();
        buf[..len].copy_from_slice(self.as_bytes());
        self.repr = Repr::Heap { buf, len };
        Ok(())
    }

    /// Replace the whole content
    pub(super) fn replace_content(&mut self, bytes: &[u8]) -> StrResult<()> {
        self.ensure_len(bytes.len())?;
        self.buffer_mut()[..bytes.len()].copy_from_slice(bytes);
        self.set_len(bytes.len());
        Ok(())
    }

    /// Make room for `additional` more content bytes
    pub fn reserve(&mut self, additional: usize) -> StrResult<()> {
        let len = self
            .len()
            .checked_add(additional)
            .ok_or(StrError::OutOfMemory(usize::MAX))?;
        self.ensure_len(len)
    }

    /// Resize the buffer to hold `new_capacity` bytes, NUL included
    ///
    /// Growing follows the capacity policy. Asking for less than the current
    /// content truncates it to `new_capacity - 1` bytes; the buffer itself
    /// never shrinks and a heap string stays on the heap.
    pub fn resize(&mut self, new_capacity: usize) -> StrResult<()> {
        if new_capacity > self.capacity() {
            return self.ensure_len(new_capacity - 1);
        }
        let keep = new_capacity.saturating_sub(1);
        if keep < self.len() {
            self.set_len(keep);
        }
        Ok(())
    }

    /// Drop the content, keeping the buffer
    #[inline]
    pub fn clear(&mut self) {
        self.set_len(0);
    }
}
