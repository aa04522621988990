/*!
 * Eviction Tests
 * CLOCK behaviour within a single shard and the capacity bound
 */

use pretty_assertions::assert_eq;
use std::time::Duration;
use sysprims::cache::KeyHash;
use sysprims::core::limits::SHARD_COUNT;
use sysprims::Cache;

/// `count` distinct keys that all land in the same shard
fn same_shard_keys(count: usize) -> (usize, Vec<String>) {
    let target = KeyHash::of(b"anchor").shard_index();
    let keys = (0..)
        .map(|i| format!("key-{}", i))
        .filter(|k| KeyHash::of(k.as_bytes()).shard_index() == target)
        .take(count)
        .collect();
    (target, keys)
}

#[test]
fn test_full_shard_evicts_exactly_one() {
    // Three entries per shard
    let cache = Cache::new(3 * SHARD_COUNT, Duration::from_secs(300));
    let (shard, keys) = same_shard_keys(4);
    let (a, b, c, d) = (&keys[0], &keys[1], &keys[2], &keys[3]);

    for key in [a, b, c] {
        cache.set(key.as_bytes(), key.as_bytes()).unwrap();
    }
    let _ = cache.get(a.as_bytes());
    let _ = cache.get(c.as_bytes());
    cache.set(d.as_bytes(), d.as_bytes()).unwrap();

    assert_eq!(cache.shard_stats()[shard].size, 3);
    assert_eq!(cache.total_size(), 3);
    assert!(cache.contains(d.as_bytes()));

    let survivors = [a, b, c]
        .iter()
        .filter(|k| cache.contains(k.as_bytes()))
        .count();
    assert_eq!(survivors, 2);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_unreferenced_entry_is_preferred_victim() {
    let cache = Cache::new(3 * SHARD_COUNT, Duration::ZERO);
    let (_, keys) = same_shard_keys(5);

    for key in &keys[..3] {
        cache.set(key.as_bytes(), b"v").unwrap();
    }
    // First insert past capacity sweeps every bit clear
    cache.set(keys[3].as_bytes(), b"v").unwrap();

    let survivors: Vec<&String> = keys[..4]
        .iter()
        .filter(|k| cache.contains(k.as_bytes()))
        .collect();
    assert_eq!(survivors.len(), 3);

    // Re-reference everything but one survivor that is not the newest entry
    let victim = survivors
        .iter()
        .find(|k| **k != &keys[3])
        .copied()
        .unwrap();
    for key in &survivors {
        if *key != victim {
            let _ = cache.get(key.as_bytes());
        }
    }

    cache.set(keys[4].as_bytes(), b"v").unwrap();
    assert!(!cache.contains(victim.as_bytes()));
    for key in survivors.iter().filter(|k| **k != victim) {
        assert!(cache.contains(key.as_bytes()), "{} was evicted", key);
    }
}

#[test]
fn test_update_does_not_evict() {
    let cache = Cache::new(2 * SHARD_COUNT, Duration::ZERO);
    let (_, keys) = same_shard_keys(2);
    cache.set(keys[0].as_bytes(), b"1").unwrap();
    cache.set(keys[1].as_bytes(), b"1").unwrap();

    for round in 0..10u8 {
        cache.set(keys[0].as_bytes(), &[round]).unwrap();
    }
    assert!(cache.contains(keys[1].as_bytes()));
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn test_size_never_exceeds_capacity() {
    let cache = Cache::new(64, Duration::ZERO);
    for i in 0..5000 {
        cache.set(format!("churn:{}", i).as_bytes(), b"payload").unwrap();
        if i % 97 == 0 {
            for shard in cache.shard_stats() {
                assert!(shard.size <= shard.capacity);
            }
        }
    }
    assert!(cache.total_size() <= cache.total_capacity());
    let stats = cache.stats();
    assert_eq!(stats.size as u64 + stats.evictions, 5000);
}
