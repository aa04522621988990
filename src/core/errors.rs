/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Arena allocation result
pub type ArenaResult<T> = std::result::Result<T, ArenaError>;

/// Cache operation result
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// String operation result
pub type StrResult<T> = std::result::Result<T, StrError>;

/// Arena allocator errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ArenaError {
    #[error("Out of memory: could not map {requested} bytes")]
    #[diagnostic(
        code(arena::out_of_memory),
        help("The OS refused the page mapping. The arena is still usable for smaller requests.")
    )]
    OutOfMemory { requested: usize },

    #[error("No arena bound to the current thread")]
    #[diagnostic(
        code(arena::no_thread_arena),
        help("Bind one with `threadlocal(Some(arena))` or `Arena::bind_thread_local`.")
    )]
    NoThreadArena,

    #[error("Pointer 0x{0:x} does not belong to this arena")]
    #[diagnostic(
        code(arena::foreign_pointer),
        help("Only pointers returned by this arena since its last reset can be resized.")
    )]
    ForeignPointer(usize),

    #[error("Allocation size {0} overflows the address space")]
    #[diagnostic(code(arena::size_overflow))]
    SizeOverflow(usize),
}

/// Cache errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum CacheError {
    #[error("Cache keys must not be empty")]
    #[diagnostic(code(cache::invalid_key))]
    InvalidKey,

    #[error("Key of {0} bytes exceeds the 32-bit length limit")]
    #[diagnostic(code(cache::key_too_large))]
    KeyTooLarge(usize),

    #[error("Value of {0} bytes exceeds the 32-bit length limit")]
    #[diagnostic(code(cache::value_too_large))]
    ValueTooLarge(usize),

    #[error("Out of memory: could not allocate a {0} byte entry")]
    #[diagnostic(
        code(cache::out_of_memory),
        help("System may be low on memory. The cache was left unchanged.")
    )]
    OutOfMemory(usize),

    #[error("Snapshot I/O error: {0}")]
    #[diagnostic(
        code(cache::io),
        help("Check file permissions and disk space.")
    )]
    Io(String),

    #[error("Not a cache snapshot (bad magic)")]
    #[diagnostic(code(cache::bad_magic))]
    BadMagic,

    #[error("Unsupported snapshot version {0}")]
    #[diagnostic(
        code(cache::unsupported_version),
        help("The snapshot was written by a newer format revision.")
    )]
    UnsupportedVersion(u32),

    #[error("Snapshot truncated at byte {offset}")]
    #[diagnostic(
        code(cache::truncated),
        help("Entries before the truncation point were loaded.")
    )]
    Truncated { offset: usize },

    #[error("Malformed snapshot: {0}")]
    #[diagnostic(code(cache::malformed))]
    Malformed(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(err.to_string())
    }
}

/// SSO string errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum StrError {
    #[error("Index {index} out of bounds for string of length {len}")]
    #[diagnostic(code(sso::index_out_of_bounds))]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Out of memory: could not grow string to {0} bytes")]
    #[diagnostic(
        code(sso::out_of_memory),
        help("The string was left unchanged.")
    )]
    OutOfMemory(usize),
}
