/*!
 * String Views
 * Borrowed, read-only byte slices with the string query set
 */

use super::repr::SsoString;
use super::scan::{count_bytes, find_bytes, rfind_bytes};
use crate::core::errors::StrResult;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Borrowed view into string content
///
/// Cannot outlive the string it was taken from, and any mutation of that
/// string requires the view to be gone first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StrView<'a> {
    bytes: &'a [u8],
}

impl<'a> StrView<'a> {
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn at(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Bytewise three-way comparison
    #[inline]
    pub fn compare(&self, other: impl AsRef<[u8]>) -> Ordering {
        self.bytes.cmp(other.as_ref())
    }

    #[inline]
    pub fn equals(&self, other: impl AsRef<[u8]>) -> bool {
        self.bytes == other.as_ref()
    }

    #[inline]
    pub fn starts_with(&self, prefix: impl AsRef<[u8]>) -> bool {
        self.bytes.starts_with(prefix.as_ref())
    }

    #[inline]
    pub fn ends_with(&self, suffix: impl AsRef<[u8]>) -> bool {
        self.bytes.ends_with(suffix.as_ref())
    }

    /// Offset of the first occurrence of `needle`
    pub fn find(&self, needle: impl AsRef<[u8]>) -> Option<usize> {
        find_bytes(self.bytes, needle.as_ref())
    }

    /// Offset of the last occurrence of `needle`
    pub fn rfind(&self, needle: impl AsRef<[u8]>) -> Option<usize> {
        rfind_bytes(self.bytes, needle.as_ref())
    }

    /// Non-overlapping occurrences of `needle`
    pub fn count_substr(&self, needle: impl AsRef<[u8]>) -> usize {
        count_bytes(self.bytes, needle.as_ref())
    }

    /// Sub-view of up to `len` bytes starting at `start`, clamped to the view
    pub fn slice(&self, start: usize, len: usize) -> StrView<'a> {
        let start = start.min(self.bytes.len());
        let end = start.saturating_add(len).min(self.bytes.len());
        StrView::new(&self.bytes[start..end])
    }

    /// Copy into an owned string
    pub fn to_owned_string(&self) -> StrResult<SsoString> {
        SsoString::from_bytes(self.bytes)
    }
}

impl Deref for StrView<'_> {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for StrView<'_> {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a str> for StrView<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for StrView<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for StrView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.bytes.escape_ascii())
    }
}

impl fmt::Display for StrView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.bytes))
    }
}
