//! Integration tests for the public cache API
//!
//! Drives a cache the way an application memoizing rendered pages would.

use std::fs;
use std::thread;
use std::time::Duration;

use fcache::{CacheConfig, CacheError, FileCache};
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Opens an hour-long, owner read-write cache over an existing directory
fn open_page_cache(temp_dir: &TempDir) -> FileCache {
    FileCache::new(temp_dir.path(), HOUR, 0o600).expect("Cache should initialize")
}

#[test]
fn test_page_is_served_then_expires_under_shorter_cache() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache = open_page_cache(&temp_dir);

    cache.set("page", "hello").expect("Write should succeed");
    assert!(temp_dir.path().join("page").exists());
    assert_eq!(cache.get("page").expect("Should hit"), b"hello");

    let short = FileCache::new(temp_dir.path(), Duration::from_millis(1), 0o600)
        .expect("Second cache should initialize");
    thread::sleep(Duration::from_millis(10));

    let err = short.get("page").expect_err("Should miss");
    assert!(matches!(err, CacheError::Miss));
    assert!(!temp_dir.path().join("page").exists());
}

#[test]
fn test_miss_for_absent_and_evicted_entries_look_the_same() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache =
        FileCache::new(temp_dir.path(), Duration::ZERO, 0o600).expect("Cache should initialize");
    cache.set("expired", "x").expect("Write should succeed");

    let absent = cache.get("never-written").expect_err("Should miss");
    let evicted = cache.get("expired").expect_err("Should miss");

    assert_eq!(absent.to_string(), evicted.to_string());
    assert!(absent.is_miss() && evicted.is_miss());
}

#[test]
fn test_entries_survive_reopening_the_cache() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = CacheConfig::new(temp_dir.path().join("pages"), HOUR);

    let first = FileCache::from_config(&config).expect("Cache should initialize");
    first.set("index.html", "<h1>hi</h1>").expect("Write should succeed");
    drop(first);

    let second = FileCache::from_config(&config).expect("Reopen should succeed");
    assert_eq!(second.get("index.html").expect("Should hit"), b"<h1>hi</h1>");
}

#[test]
fn test_flush_and_flush_all_through_public_api() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache = FileCache::new(temp_dir.path().join("cache"), HOUR, 0o755)
        .expect("Cache should initialize");

    cache.set("a", "x").expect("Write should succeed");
    cache.set("b", "y").expect("Write should succeed");

    cache.flush("a").expect("Flush should succeed");
    assert!(!cache.is_valid("a"));
    assert_eq!(cache.get("b").expect("Should hit"), b"y");

    cache.flush_all().expect("Flush all should succeed");
    assert!(cache.get("b").expect_err("Should miss").is_miss());
    assert!(fs::read_dir(cache.directory()).unwrap().next().is_none());

    cache.set("c", "z").expect("Write should succeed");
    assert_eq!(cache.get("c").expect("Should hit"), b"z");
}
