/*!
 * Split and Join
 */

use super::repr::SsoString;
use super::scan::find_bytes;
use crate::core::errors::{StrError, StrResult};

impl SsoString {
    /// Split on every occurrence of `delim`
    ///
    /// An empty delimiter yields one copy of the whole string. Adjacent
    /// delimiters yield empty parts, and a trailing delimiter yields a
    /// trailing empty part.
    pub fn split(&self, delim: impl AsRef<[u8]>) -> StrResult<Vec<SsoString>> {
        let delim = delim.as_ref();
        let src = self.as_bytes();
        if delim.is_empty() {
            return Ok(vec![SsoString::from_bytes(src)?]);
        }

        let mut parts = Vec::new();
        let mut rest = src;
        while let Some(pos) = find_bytes(rest, delim) {
            parts.push(SsoString::from_bytes(&rest[..pos])?);
            rest = &rest[pos + delim.len()..];
        }
        parts.push(SsoString::from_bytes(rest)?);
        Ok(parts)
    }

    /// Concatenate `parts` with `delim` between neighbours
    ///
    /// No delimiter precedes the first part; no parts gives an empty string.
    pub fn join<I, S>(parts: I, delim: impl AsRef<[u8]>) -> StrResult<SsoString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let delim = delim.as_ref();
        let mut out = SsoString::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.append(delim)?;
            }
            out.append(part)?;
        }
        Ok(out)
    }

    /// Join borrowed byte slices, sizing the result up front
    pub fn join_slices(parts: &[&[u8]], delim: impl AsRef<[u8]>) -> StrResult<SsoString> {
        let delim = delim.as_ref();
        let total = parts
            .iter()
            .try_fold(0usize, |acc, part| acc.checked_add(part.len()))
            .and_then(|len| len.checked_add(delim.len() * parts.len().saturating_sub(1)))
            .ok_or(StrError::OutOfMemory(usize::MAX))?;

        let mut out = SsoString::with_capacity(total + 1)?;
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.append(delim)?;
            }
            out.append(part)?;
        }
        Ok(out)
    }
}
