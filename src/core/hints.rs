/*!
 * Compiler Optimization Hints
 * Branch prediction hints for the allocator and cache hot paths
 */

#[cold]
#[inline(never)]
fn cold_path() {}

/// Hint to the compiler that this branch is likely to be taken
///
/// # Implementation
/// Stable Rust has no `llvm.expect`; routing the unlikely arm through a
/// `#[cold]` function gives the optimizer the same layout information.
///
/// # Example
/// ```ignore
/// if likely(chunk.fits(total)) {
///     // Bump path
/// } else {
///     // Grow the arena
/// }
/// ```
#[inline(always)]
#[must_use]
pub fn likely(b: bool) -> bool {
    if !b {
        cold_path();
    }
    b
}

/// Hint to the compiler that this branch is unlikely to be taken
#[inline(always)]
#[must_use]
pub fn unlikely(b: bool) -> bool {
    if b {
        cold_path();
    }
    b
}
