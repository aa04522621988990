/*!
 * Thread-Local Default Arena
 *
 * Each thread may bind one arena as its default. `alloc_in(None, ..)`
 * dispatches to it. Bindings are scoped: the guard returned by
 * [`Arena::bind_thread_local`] restores the previous binding on drop, and a
 * thread's binding is released when the thread exits.
 */

use super::arena::Arena;
use crate::core::errors::{ArenaError, ArenaResult};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::trace;

thread_local! {
    static THREAD_ARENA: RefCell<Option<Arc<Arena>>> = const { RefCell::new(None) };
}

/// Replace the current thread's default arena, returning the previous one
///
/// Passing `None` clears the binding.
pub fn threadlocal(arena: Option<Arc<Arena>>) -> Option<Arc<Arena>> {
    THREAD_ARENA.with(|cell| {
        trace!(bound = arena.is_some(), "Thread arena binding changed");
        cell.replace(arena)
    })
}

/// Current thread's default arena, if any
pub fn current() -> Option<Arc<Arena>> {
    THREAD_ARENA.with(|cell| cell.borrow().clone())
}

/// Run `f` against the thread's default arena
pub fn with_thread_arena<F, R>(f: F) -> ArenaResult<R>
where
    F: FnOnce(&Arena) -> R,
{
    THREAD_ARENA.with(|cell| {
        let bound = cell.borrow();
        bound.as_deref().map(f).ok_or(ArenaError::NoThreadArena)
    })
}

/// Allocate from `arena`, or from the thread's default arena when `None`
pub fn alloc_in(arena: Option<&Arena>, size: usize) -> ArenaResult<NonNull<u8>> {
    match arena {
        Some(arena) => arena.alloc(size),
        None => with_thread_arena(|arena| arena.alloc(size))?,
    }
}

/// Resize through `arena`, or through the thread's default arena when `None`
///
/// # Safety
///
/// Same contract as [`Arena::realloc`].
pub unsafe fn realloc_in(
    arena: Option<&Arena>,
    ptr: Option<NonNull<u8>>,
    size: usize,
) -> ArenaResult<NonNull<u8>> {
    match arena {
        // SAFETY: forwarded caller contract
        Some(arena) => unsafe { arena.realloc(ptr, size) },
        None => with_thread_arena(|arena| unsafe { arena.realloc(ptr, size) })?,
    }
}

/// Scoped thread-local binding; restores the previous binding on drop
///
/// Not `Send`: it must be dropped on the thread that created it.
#[must_use = "the binding is undone as soon as the guard is dropped"]
pub struct ThreadArenaGuard {
    previous: Option<Arc<Arena>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ThreadArenaGuard {
    fn drop(&mut self) {
        threadlocal(self.previous.take());
    }
}

impl Arena {
    /// Bind this arena as the current thread's default until the guard drops
    pub fn bind_thread_local(self: &Arc<Self>) -> ThreadArenaGuard {
        ThreadArenaGuard {
            previous: threadlocal(Some(Arc::clone(self))),
            _not_send: PhantomData,
        }
    }
}
