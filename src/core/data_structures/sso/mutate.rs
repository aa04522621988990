/*!
 * SSO Mutation
 * Appending, inserting and removing content in place
 */

use super::repr::SsoString;
use crate::core::errors::{StrError, StrResult};
use std::fmt::{self, Write};

/// Collects the first append failure while formatting
struct FmtSink<'a> {
    target: &'a mut SsoString,
    error: Option<StrError>,
}

impl Write for FmtSink<'_> {
    fn write_str(&mut self, part: &str) -> fmt::Result {
        self.target.append(part).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

impl SsoString {
    /// Append `s`, promoting to the heap if needed
    pub fn append(&mut self, s: impl AsRef<[u8]>) -> StrResult<()> {
        let s = s.as_ref();
        let len = self.len();
        let new_len = len
            .checked_add(s.len())
            .ok_or(StrError::OutOfMemory(usize::MAX))?;

        self.ensure_len(new_len)?;
        self.buffer_mut()[len..new_len].copy_from_slice(s);
        self.set_len(new_len);
        Ok(())
    }

    #[inline]
    pub fn append_char(&mut self, c: u8) -> StrResult<()> {
        self.append([c])
    }

    /// Append formatted output; on failure the content is left as it was
    ///
    /// ```ignore
    /// s.append_fmt(format_args!("{}:{}", host, port))?;
    /// ```
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> StrResult<()> {
        let len = self.len();
        let mut sink = FmtSink {
            target: self,
            error: None,
        };

        if sink.write_fmt(args).is_err() {
            let error = sink.error.take();
            self.set_len(len);
            // A failing Display impl is not an allocation failure
            return Err(error.unwrap_or(StrError::OutOfMemory(len)));
        }
        Ok(())
    }

    #[inline]
    pub fn prepend(&mut self, s: impl AsRef<[u8]>) -> StrResult<()> {
        self.insert(0, s)
    }

    /// Insert `s` before byte `index`
    pub fn insert(&mut self, index: usize, s: impl AsRef<[u8]>) -> StrResult<()> {
        let s = s.as_ref();
        let len = self.len();
        if index > len {
            return Err(StrError::IndexOutOfBounds { index, len });
        }
        let new_len = len
            .checked_add(s.len())
            .ok_or(StrError::OutOfMemory(usize::MAX))?;

        self.ensure_len(new_len)?;
        let buf = self.buffer_mut();
        buf.copy_within(index..len, index + s.len());
        buf[index..index + s.len()].copy_from_slice(s);
        self.set_len(new_len);
        Ok(())
    }

    /// Remove up to `count` bytes starting at `index`
    pub fn remove(&mut self, index: usize, count: usize) -> StrResult<()> {
        let len = self.len();
        if index > len {
            return Err(StrError::IndexOutOfBounds { index, len });
        }
        let end = index + count.min(len - index);

        self.buffer_mut().copy_within(end..len, index);
        self.set_len(len - (end - index));
        Ok(())
    }

    /// Remove every non-overlapping occurrence of `sub`; returns the count
    pub fn remove_all(&mut self, sub: impl AsRef<[u8]>) -> usize {
        let sub = sub.as_ref();
        if sub.is_empty() {
            return 0;
        }

        let len = self.len();
        let buf = self.buffer_mut();
        let (mut read, mut write, mut removed) = (0, 0, 0);
        while read < len {
            if buf[read..len].starts_with(sub) {
                read += sub.len();
                removed += 1;
            } else {
                buf[write] = buf[read];
                write += 1;
                read += 1;
            }
        }
        self.set_len(write);
        removed
    }

    /// Remove every occurrence of byte `c`; returns the count
    pub fn remove_char(&mut self, c: u8) -> usize {
        let len = self.len();
        let buf = self.buffer_mut();
        let mut write = 0;
        for read in 0..len {
            if buf[read] != c {
                buf[write] = buf[read];
                write += 1;
            }
        }
        self.set_len(write);
        len - write
    }
}
