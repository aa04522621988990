/*!
 * SSO Queries
 * Searching and comparison, plus operations that build a new string
 */

use super::repr::SsoString;
use super::scan::{count_bytes, find_bytes};
use crate::core::errors::{StrError, StrResult};
use std::cmp::Ordering;

impl SsoString {
    #[inline]
    pub fn compare(&self, other: impl AsRef<[u8]>) -> Ordering {
        self.as_view().compare(other)
    }

    #[inline]
    pub fn equals(&self, other: impl AsRef<[u8]>) -> bool {
        self.as_view().equals(other)
    }

    #[inline]
    pub fn starts_with(&self, prefix: impl AsRef<[u8]>) -> bool {
        self.as_view().starts_with(prefix)
    }

    #[inline]
    pub fn ends_with(&self, suffix: impl AsRef<[u8]>) -> bool {
        self.as_view().ends_with(suffix)
    }

    /// Offset of the first occurrence of `needle`; `Some(0)` when empty
    #[inline]
    pub fn find(&self, needle: impl AsRef<[u8]>) -> Option<usize> {
        self.as_view().find(needle)
    }

    /// Offset of the last occurrence of `needle`; `Some(len)` when empty
    #[inline]
    pub fn rfind(&self, needle: impl AsRef<[u8]>) -> Option<usize> {
        self.as_view().rfind(needle)
    }

    /// Non-overlapping occurrences of `needle`
    #[inline]
    pub fn count_substr(&self, needle: impl AsRef<[u8]>) -> usize {
        self.as_view().count_substr(needle)
    }

    /// Copy of up to `len` bytes starting at `start`
    pub fn substr(&self, start: usize, len: usize) -> StrResult<SsoString> {
        if start > self.len() {
            return Err(StrError::IndexOutOfBounds {
                index: start,
                len: self.len(),
            });
        }
        self.as_view().slice(start, len).to_owned_string()
    }

    /// Copy with the first occurrence of `from` replaced by `to`
    pub fn replace(&self, from: impl AsRef<[u8]>, to: impl AsRef<[u8]>) -> StrResult<SsoString> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let src = self.as_bytes();
        let pos = match find_bytes(src, from) {
            Some(pos) if !from.is_empty() => pos,
            _ => return SsoString::from_bytes(src),
        };

        let mut out = SsoString::with_capacity(src.len() - from.len() + to.len() + 1)?;
        out.append(&src[..pos])?;
        out.append(to)?;
        out.append(&src[pos + from.len()..])?;
        Ok(out)
    }

    /// Copy with every non-overlapping occurrence of `from` replaced by `to`
    pub fn replace_all(
        &self,
        from: impl AsRef<[u8]>,
        to: impl AsRef<[u8]>,
    ) -> StrResult<SsoString> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let src = self.as_bytes();
        let hits = count_bytes(src, from);
        if hits == 0 {
            return SsoString::from_bytes(src);
        }

        let out_len = (src.len() - hits * from.len())
            .checked_add(hits.checked_mul(to.len()).ok_or(StrError::OutOfMemory(usize::MAX))?)
            .ok_or(StrError::OutOfMemory(usize::MAX))?;
        let mut out = SsoString::with_capacity(out_len + 1)?;

        let mut rest = src;
        while let Some(pos) = find_bytes(rest, from) {
            out.append(&rest[..pos])?;
            out.append(to)?;
            rest = &rest[pos + from.len()..];
        }
        out.append(rest)?;
        Ok(out)
    }

    /// Reversed copy
    pub fn reverse(&self) -> StrResult<SsoString> {
        let mut out = SsoString::from_bytes(self.as_bytes())?;
        out.reverse_in_place();
        Ok(out)
    }
}
