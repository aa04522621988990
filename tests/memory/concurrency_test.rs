/*!
 * Arena Concurrency Tests
 * Many threads bumping one shared arena
 */

use serial_test::serial;
use std::sync::Arc;
use std::thread;
use sysprims::Arena;

const THREADS: usize = 8;
const ALLOCS_PER_THREAD: usize = 10_000;
const BLOCK: usize = 1024;

#[test]
#[serial]
fn test_parallel_allocation_from_shared_arena() {
    let arena = Arc::new(Arena::new(0).expect("Failed to create arena"));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let arena = Arc::clone(&arena);
            thread::spawn(move || {
                (0..ALLOCS_PER_THREAD)
                    .map(|i| {
                        let ptr = arena.alloc(BLOCK).expect("Allocation returned an error");
                        // Stamp first and last byte to catch overlapping blocks
                        unsafe {
                            ptr.as_ptr().write(t as u8);
                            ptr.as_ptr().add(BLOCK - 1).write(i as u8);
                        }
                        (ptr.as_ptr() as usize, t as u8, i as u8)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut stamps = Vec::with_capacity(THREADS * ALLOCS_PER_THREAD);
    for handle in handles {
        stamps.extend(handle.join().expect("Allocator thread panicked"));
    }

    for &(addr, t, i) in &stamps {
        let ptr = addr as *const u8;
        unsafe {
            assert_eq!(ptr.read(), t, "first byte of block {:#x} overwritten", addr);
            assert_eq!(ptr.add(BLOCK - 1).read(), i, "last byte of block {:#x} overwritten", addr);
        }
    }

    let stats = arena.stats();
    let live = THREADS * ALLOCS_PER_THREAD * BLOCK;
    assert!(stats.used_bytes >= live, "used {} < {}", stats.used_bytes, live);
    assert!(stats.reserved_bytes >= live);
    assert!(stats.chunk_count > 1);
}

#[test]
fn test_distinct_blocks_across_threads() {
    let arena = Arc::new(Arena::new(64 * 1024).expect("Failed to create arena"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let arena = Arc::clone(&arena);
            thread::spawn(move || {
                (0..500)
                    .map(|_| arena.alloc(48).unwrap().as_ptr() as usize)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut addrs: Vec<usize> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = addrs.len();
    addrs.sort_unstable();
    addrs.dedup();
    assert_eq!(addrs.len(), total);
}
