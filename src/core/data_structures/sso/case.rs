/*!
 * SSO Transforms
 * In-place case conversion, trimming and reversal (ASCII only)
 */

use super::repr::{scratch, SsoString};
use super::scan::is_c_space;
use crate::core::errors::StrResult;

impl SsoString {
    pub fn lower(&mut self) {
        self.as_mut_bytes().make_ascii_lowercase();
    }

    pub fn upper(&mut self) {
        self.as_mut_bytes().make_ascii_uppercase();
    }

    /// `HelloWorld` -> `hello_world`
    ///
    /// Every uppercase letter after the first output byte gets a `_` prefix
    /// and is lowercased. Spaces are dropped. May grow the string.
    pub fn snake_case(&mut self) -> StrResult<()> {
        let out = {
            let src = self.as_bytes();
            let uppers = src.iter().filter(|b| b.is_ascii_uppercase()).count();
            let mut out = scratch(src.len() + uppers)?;
            for &b in src {
                if b == b' ' {
                    continue;
                }
                if b.is_ascii_uppercase() {
                    if !out.is_empty() && out.last() != Some(&b'_') {
                        out.push(b'_');
                    }
                    out.push(b.to_ascii_lowercase());
                } else {
                    out.push(b);
                }
            }
            out
        };
        self.replace_content(&out)
    }

    /// `hello_world` / `hello world` -> `helloWorld`
    pub fn camel_case(&mut self) -> StrResult<()> {
        self.join_words(false)
    }

    /// `hello_world` / `hello world` -> `HelloWorld`
    pub fn pascal_case(&mut self) -> StrResult<()> {
        self.join_words(true)
    }

    /// Drop spaces and underscores, uppercasing the byte after each one;
    /// the first output byte is forced to the requested case
    fn join_words(&mut self, upper_first: bool) -> StrResult<()> {
        let out = {
            let src = self.as_bytes();
            let mut out = scratch(src.len())?;
            let mut boundary = false;
            for &b in src {
                if b == b' ' || b == b'_' {
                    boundary = true;
                    continue;
                }
                let c = if out.is_empty() {
                    if upper_first {
                        b.to_ascii_uppercase()
                    } else {
                        b.to_ascii_lowercase()
                    }
                } else if boundary {
                    b.to_ascii_uppercase()
                } else {
                    b
                };
                out.push(c);
                boundary = false;
            }
            out
        };
        self.replace_content(&out)
    }

    /// Uppercase the first letter of each whitespace-separated word,
    /// lowercase the rest
    pub fn title_case(&mut self) {
        let mut word_start = true;
        for b in self.as_mut_bytes() {
            if is_c_space(*b) {
                word_start = true;
            } else if word_start {
                b.make_ascii_uppercase();
                word_start = false;
            } else {
                b.make_ascii_lowercase();
            }
        }
    }

    fn trim_start_by(&mut self, pred: impl Fn(u8) -> bool) {
        let len = self.len();
        let skip = self.as_bytes().iter().take_while(|&&b| pred(b)).count();
        if skip > 0 {
            self.buffer_mut().copy_within(skip..len, 0);
            self.set_len(len - skip);
        }
    }

    fn trim_end_by(&mut self, pred: impl Fn(u8) -> bool) {
        let keep = self
            .as_bytes()
            .iter()
            .rposition(|&b| !pred(b))
            .map_or(0, |last| last + 1);
        self.set_len(keep);
    }

    /// Strip leading and trailing C whitespace (`\v` included)
    pub fn trim(&mut self) {
        self.trim_end_by(is_c_space);
        self.trim_start_by(is_c_space);
    }

    pub fn ltrim(&mut self) {
        self.trim_start_by(is_c_space);
    }

    pub fn rtrim(&mut self) {
        self.trim_end_by(is_c_space);
    }

    /// Strip leading and trailing bytes found in `set`
    pub fn trim_chars(&mut self, set: impl AsRef<[u8]>) {
        let set = set.as_ref();
        self.trim_end_by(|b| set.contains(&b));
        self.trim_start_by(|b| set.contains(&b));
    }

    pub fn reverse_in_place(&mut self) {
        self.as_mut_bytes().reverse();
    }
}
