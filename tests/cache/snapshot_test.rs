/*!
 * Snapshot Tests
 * Save/load through real files
 */

use pretty_assertions::assert_eq;
use std::fs;
use std::thread;
use std::time::Duration;
use sysprims::{Cache, CacheError};
use tempfile::TempDir;

#[test]
fn test_save_then_load_restores_entries() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("cache.snap");

    let source = Cache::new(1024, Duration::from_secs(600));
    for i in 0..100 {
        let key = format!("user:{}", i);
        source.set(key.as_bytes(), format!("{{\"id\":{}}}", i).as_bytes()).unwrap();
    }
    assert_eq!(source.save(&path).expect("save failed"), 100);
    assert!(!dir.path().join("cache.snap.tmp").exists());

    let restored = Cache::new(1024, Duration::from_secs(600));
    assert_eq!(restored.load(&path).expect("load failed"), 100);
    assert_eq!(restored.total_size(), 100);
    assert_eq!(&*restored.get(b"user:42").unwrap(), b"{\"id\":42}");

    // Absolute expiry travels with the entry
    let original = source.get(b"user:7").unwrap().expires_at();
    assert_eq!(restored.get(b"user:7").unwrap().expires_at(), original);
}

#[test]
fn test_expired_entries_are_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.snap");

    let cache = Cache::new(64, Duration::ZERO);
    cache
        .set_with_ttl(b"short", b"x", Duration::from_millis(30))
        .unwrap();
    cache.set(b"long", b"y").unwrap();
    thread::sleep(Duration::from_millis(80));

    assert_eq!(cache.save(&path).unwrap(), 1);
    let restored = Cache::default();
    assert_eq!(restored.load(&path).unwrap(), 1);
    assert!(restored.get(b"long").is_some());
}

#[test]
fn test_entries_expiring_after_save_are_skipped_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.snap");

    let cache = Cache::new(64, Duration::ZERO);
    cache
        .set_with_ttl(b"soon", b"x", Duration::from_millis(50))
        .unwrap();
    assert_eq!(cache.save(&path).unwrap(), 1);
    thread::sleep(Duration::from_millis(100));

    let restored = Cache::default();
    assert_eq!(restored.load(&path).unwrap(), 0);
    assert_eq!(restored.total_size(), 0);
}

#[test]
fn test_load_rejects_foreign_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not-a-snapshot");
    fs::write(&path, b"hello world, not a cache").unwrap();

    let cache = Cache::default();
    assert_eq!(cache.load(&path), Err(CacheError::BadMagic));
    assert_eq!(cache.total_size(), 0);
}

#[test]
fn test_truncated_file_keeps_applied_prefix() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.snap");

    let source = Cache::new(256, Duration::ZERO);
    for i in 0..20 {
        source.set(format!("k{}", i).as_bytes(), b"value").unwrap();
    }
    source.save(&path).unwrap();

    let mut data = fs::read(&path).unwrap();
    // Drop the sentinel and half of the last record
    data.truncate(data.len() - 16 - 4);
    fs::write(&path, &data).unwrap();

    let restored = Cache::new(256, Duration::ZERO);
    let err = restored.load(&path).unwrap_err();
    assert!(matches!(err, CacheError::Truncated { .. }));
    assert_eq!(restored.total_size(), 19);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let cache = Cache::default();
    let err = cache.load(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, CacheError::Io(_)));
}

#[test]
fn test_save_failure_keeps_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.snap");

    let cache = Cache::default();
    cache.set(b"k", b"v").unwrap();
    cache.save(&path).unwrap();
    let before = fs::read(&path).unwrap();

    // A directory in place of the temp file makes the write fail
    fs::create_dir(dir.path().join("cache.snap.tmp")).unwrap();
    cache.set(b"k2", b"v2").unwrap();
    assert!(cache.save(&path).is_err());
    assert_eq!(fs::read(&path).unwrap(), before);
}
