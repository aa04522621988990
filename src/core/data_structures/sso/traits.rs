/*!
 * SSO Trait Implementations
 */

use super::repr::SsoString;
use crate::core::errors::StrError;
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;

impl Default for SsoString {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SsoString {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for SsoString {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Borrow<[u8]> for SsoString {
    #[inline]
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for SsoString {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SsoString {}

impl PartialEq<str> for SsoString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for SsoString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<[u8]> for SsoString {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialOrd for SsoString {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SsoString {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for SsoString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for SsoString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_bytes().escape_ascii())
    }
}

impl fmt::Display for SsoString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Write for SsoString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s).map_err(|_| fmt::Error)
    }
}

/// Infallible conversion; aborts on allocation failure like `String`.
/// Use [`SsoString::from_bytes`] where out-of-memory must be reported.
impl From<&str> for SsoString {
    fn from(s: &str) -> Self {
        Self::from_vec(s.as_bytes().to_vec())
    }
}

/// Infallible conversion; aborts on allocation failure like `String`.
/// Use [`SsoString::from_bytes`] where out-of-memory must be reported.
impl From<String> for SsoString {
    fn from(s: String) -> Self {
        Self::from_vec(s.into_bytes())
    }
}

/// Infallible conversion; aborts on allocation failure like `String`.
/// Use [`SsoString::from_bytes`] where out-of-memory must be reported.
impl From<&[u8]> for SsoString {
    fn from(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }
}

impl FromStr for SsoString {
    type Err = StrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl Serialize for SsoString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(s) => serializer.serialize_str(s),
            None => serializer.serialize_bytes(self.as_bytes()),
        }
    }
}

struct SsoStringVisitor;

impl<'de> Visitor<'de> for SsoStringVisitor {
    type Value = SsoString;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or byte sequence")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SsoString, E> {
        SsoString::from_bytes(v.as_bytes()).map_err(E::custom)
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<SsoString, E> {
        Ok(SsoString::from(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<SsoString, E> {
        SsoString::from_bytes(v).map_err(E::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<SsoString, A::Error> {
        let mut out = SsoString::new();
        while let Some(byte) = seq.next_element::<u8>()? {
            out.append_char(byte).map_err(de::Error::custom)?;
        }
        Ok(out)
    }
}

impl<'de> Deserialize<'de> for SsoString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SsoStringVisitor)
    }
}
