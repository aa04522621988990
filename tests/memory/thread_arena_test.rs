/*!
 * Thread-Local Arena Tests
 */

use std::sync::Arc;
use std::thread;
use sysprims::core::memory::{alloc_in, current, threadlocal, with_thread_arena};
use sysprims::{Arena, ArenaConfig, ArenaError};

fn shared_arena() -> Arc<Arena> {
    Arc::new(
        Arena::with_config(ArenaConfig::with_chunk_size(16 * 1024).unpooled())
            .expect("Failed to create arena"),
    )
}

#[test]
fn test_default_dispatch_requires_binding() {
    threadlocal(None);
    assert_eq!(alloc_in(None, 32).unwrap_err(), ArenaError::NoThreadArena);
    assert!(current().is_none());
}

#[test]
fn test_unscoped_binding_roundtrip() {
    let arena = shared_arena();
    let previous = threadlocal(Some(Arc::clone(&arena)));
    assert!(previous.is_none());

    let ptr = alloc_in(None, 100).expect("Default arena allocation failed");
    assert!(arena.owns(ptr.as_ptr()));

    let unbound = threadlocal(None).expect("Binding should have been returned");
    assert!(Arc::ptr_eq(&unbound, &arena));
}

#[test]
fn test_guard_scopes_binding() {
    let arena = shared_arena();
    {
        let _guard = arena.bind_thread_local();
        let used = with_thread_arena(|a| a.stats().head_used).unwrap();
        assert_eq!(used, 0);
        alloc_in(None, 64).unwrap();
    }
    assert!(current().is_none());
    assert!(arena.stats().head_used > 0);
}

#[test]
fn test_each_thread_binds_its_own_arena() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(|| {
                let arena = shared_arena();
                let _guard = arena.bind_thread_local();
                for _ in 0..100 {
                    alloc_in(None, 32).unwrap();
                }
                arena.stats().used_bytes
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 100 * (32 + 16));
    }
}

#[test]
fn test_binding_released_on_thread_exit() {
    let arena = shared_arena();
    let worker = Arc::clone(&arena);
    thread::spawn(move || {
        threadlocal(Some(worker));
    })
    .join()
    .unwrap();

    assert_eq!(Arc::strong_count(&arena), 1);
}
