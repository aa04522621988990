/*!
 * Cache Concurrency Tests
 * Mixed readers and writers hammering a small key set
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use sysprims::Cache;

const THREADS: u64 = 8;
const OPS_PER_THREAD: usize = 1000;
const KEYS: usize = 10;

#[test]
fn test_mixed_operations_stay_within_capacity() {
    let cache = Arc::new(Cache::new(20, Duration::from_secs(60)));

    let handles: Vec<_> = (0..THREADS)
        .map(|seed| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut held = Vec::new();
                for _ in 0..OPS_PER_THREAD {
                    let key = format!("key{}", rng.gen_range(0..KEYS));
                    match rng.gen_range(0..10) {
                        0..=3 => {
                            let value = format!("{}:{}", key, seed);
                            cache.set(key.as_bytes(), value.as_bytes()).unwrap();
                        }
                        4..=7 => {
                            if let Some(value) = cache.get(key.as_bytes()) {
                                // Values always start with their own key
                                assert!(value.starts_with(key.as_bytes()));
                                if held.len() < 16 {
                                    held.push(value);
                                }
                            }
                        }
                        8 => {
                            cache.invalidate(key.as_bytes());
                        }
                        _ => {
                            let _ = cache.contains(key.as_bytes());
                        }
                    }
                }
                held
            })
        })
        .collect();

    let mut outstanding = Vec::new();
    for handle in handles {
        outstanding.extend(handle.join().expect("Worker panicked"));
    }

    assert!(cache.total_size() <= cache.total_capacity());
    for shard in cache.shard_stats() {
        assert!(shard.size <= shard.capacity);
    }

    // Held handles stay readable after the cache is gone
    let cache = Arc::try_unwrap(cache).expect("Cache still shared");
    cache.destroy();
    // Only the handles themselves keep entries alive now
    for value in &outstanding {
        assert!(value.starts_with(value.key()));
        let holders = outstanding
            .iter()
            .filter(|other| other.as_ptr() == value.as_ptr())
            .count();
        assert_eq!(value.ref_count(), holders);
    }
}

#[test]
fn test_concurrent_writers_to_distinct_shards() {
    let cache = Arc::new(Cache::new(32 * 64, Duration::ZERO));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..200 {
                    let key = format!("t{}-{}", t, i);
                    cache.set(key.as_bytes(), key.as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.size as u64 + stats.evictions, 800);
}
