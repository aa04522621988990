/*!
 * Cache Tests
 * Basic operations, TTL expiry and zero-copy lifetimes
 */

use pretty_assertions::assert_eq;
use std::thread;
use std::time::Duration;
use sysprims::{Cache, CacheConfig, CacheError};

#[test]
fn test_set_then_get_returns_stored_bytes() {
    let cache = Cache::new(1000, Duration::from_secs(300));
    let pairs: Vec<(String, Vec<u8>)> = (0..50)
        .map(|i| (format!("key:{}", i), vec![i as u8; i]))
        .collect();

    for (key, value) in &pairs {
        cache.set(key.as_bytes(), value).expect("set failed");
    }
    for (key, value) in &pairs {
        let found = cache.get(key.as_bytes()).expect("missing key");
        assert_eq!(found.len(), value.len());
        assert_eq!(&*found, &value[..]);
    }
    assert_eq!(cache.total_size(), pairs.len());
}

#[test]
fn test_invalidate_then_get_misses() {
    let cache = Cache::default();
    cache.set(b"session", b"abc").unwrap();
    assert!(cache.invalidate(b"session"));
    assert!(cache.get(b"session").is_none());
    assert!(!cache.contains(b"session"));
}

#[test]
fn test_invalid_keys() {
    let cache = Cache::default();
    assert_eq!(cache.set(b"", b"value"), Err(CacheError::InvalidKey));
    assert_eq!(cache.total_size(), 0);
}

#[test]
fn test_ttl_expiry_on_get() {
    let cache = Cache::new(10, Duration::from_secs(300));
    cache
        .set_with_ttl(b"k", b"v", Duration::from_millis(50))
        .unwrap();
    assert!(cache.get(b"k").is_some());

    thread::sleep(Duration::from_millis(120));
    assert!(cache.get(b"k").is_none());
    assert_eq!(cache.total_size(), 0);
    assert_eq!(cache.stats().expirations, 1);
}

#[test]
fn test_default_ttl_expiry() {
    let cache = Cache::new(10, Duration::from_millis(50));
    cache.set(b"k", b"v").unwrap();
    thread::sleep(Duration::from_millis(120));
    assert!(cache.get(b"k").is_none());
    assert_eq!(cache.total_size(), 0);
}

#[test]
fn test_purge_expired_sweeps_without_access() {
    let cache = Cache::new(100, Duration::ZERO);
    for i in 0..10 {
        let key = format!("short{}", i);
        cache
            .set_with_ttl(key.as_bytes(), b"x", Duration::from_millis(30))
            .unwrap();
    }
    cache.set(b"forever", b"y").unwrap();

    thread::sleep(Duration::from_millis(80));
    assert_eq!(cache.purge_expired(), 10);
    assert_eq!(cache.total_size(), 1);
    assert!(cache.get(b"forever").is_some());
}

#[test]
fn test_zero_copy_handle_survives_invalidate_update_and_destroy() {
    let cache = Cache::new(64, Duration::ZERO);
    cache.set(b"k", b"original").unwrap();

    let held = cache.get(b"k").unwrap();
    let before = held.as_ptr();

    assert!(cache.invalidate(b"k"));
    assert_eq!(&*held, b"original");

    cache.set(b"k", b"replacement").unwrap();
    assert_eq!(&*held, b"original");
    assert_eq!(&*cache.get(b"k").unwrap(), b"replacement");

    cache.destroy();
    assert_eq!(held.as_ptr(), before);
    assert_eq!(&*held, b"original");
    assert_eq!(held.ref_count(), 1);
    held.release();
}

#[test]
fn test_clear_drops_everything() {
    let cache = Cache::default();
    for i in 0..100 {
        cache.set(format!("k{}", i).as_bytes(), b"v").unwrap();
    }
    assert_eq!(cache.clear(), 100);
    assert_eq!(cache.total_size(), 0);
    assert!(cache.get(b"k1").is_none());
}

#[test]
fn test_config_presets_drive_capacity() {
    let cache = Cache::with_config(CacheConfig::default().with_capacity(640));
    assert_eq!(cache.total_capacity(), 640);
    assert_eq!(cache.shard_stats().len(), 32);
    assert!(cache.shard_stats().iter().all(|s| s.capacity == 20));
}

#[test]
fn test_stats_serialize() {
    let cache = Cache::default();
    cache.set(b"a", b"1").unwrap();
    let _ = cache.get(b"a");
    let json = serde_json::to_value(cache.stats()).unwrap();
    assert_eq!(json["hits"], 1);
    assert_eq!(json["size"], 1);
}
