//! Tests for cache-backed table persistence
//!
//! # Test Coverage
//!
//! - First dispatch populating the backend, warm reuse on later loads
//! - Degradation paths: invalid blobs, broken backends, disabled caching
//! - Explicit `refresh_cache` semantics, including while disabled
//! - A file-backed backend exercising the blob format across "processes"

use rapidroute::{Cache, CachedRouter, MatcherKind, MemoryCache, Route, DEFAULT_CACHE_KEY};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;

/// Backend wrapper that counts calls, for asserting cache traffic.
#[derive(Default)]
struct RecordingCache {
    inner: MemoryCache,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl Cache for RecordingCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> bool {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn has(&self, key: &str) -> bool {
        self.inner.has(key)
    }
}

/// Backend where every operation fails.
struct FailingCache;

impl Cache for FailingCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: Vec<u8>) -> bool {
        false
    }

    fn has(&self, _key: &str) -> bool {
        false
    }
}

/// One-file-per-key backend; I/O errors read as absence.
struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.bin"))
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.entry_path(key)).ok()
    }

    fn set(&self, key: &str, value: Vec<u8>) -> bool {
        std::fs::write(self.entry_path(key), value).is_ok()
    }

    fn has(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }
}

fn sample_router(cache: Arc<dyn Cache>) -> CachedRouter<String> {
    let mut router = CachedRouter::new(cache);
    router
        .get(r"/user/{id:\d+}", "get_user".to_string())
        .expect("add")
        .post("/user", "create_user".to_string())
        .expect("add");
    router
}

#[test]
fn cached_dispatch_matches_like_a_fresh_build() {
    common::init_tracing();
    let router = sample_router(Arc::new(MemoryCache::new()));

    let hit = router.dispatch(&("GET", "/user/42"));
    assert_eq!(hit.status(), 200);
    assert_eq!(hit.attribute("id"), Some("42"));
    assert_eq!(hit.handler(), Some(&"get_user".to_string()));

    assert_eq!(router.dispatch(&("GET", "/user/abc")).status(), 404);
    assert_eq!(router.dispatch(&("PUT", "/user")).status(), 405);
}

#[test]
fn first_dispatch_populates_the_backend() {
    common::init_tracing();
    let cache = Arc::new(MemoryCache::new());
    let router = sample_router(cache.clone());

    assert!(!cache.has(DEFAULT_CACHE_KEY));
    router.dispatch(&("GET", "/user/1"));
    assert!(cache.has(DEFAULT_CACHE_KEY));
}

#[test]
fn warm_cache_is_reused_instead_of_rebuilt() {
    common::init_tracing();
    let cache = Arc::new(RecordingCache::default());

    // First router writes the entry.
    sample_router(cache.clone()).dispatch(&("GET", "/user/1"));
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);

    // A second router over the same backend loads without writing.
    let router = sample_router(cache.clone());
    assert_eq!(router.dispatch(&("GET", "/user/2")).attribute("id"), Some("2"));
    assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
}

#[test]
fn disabled_cache_never_touches_the_backend() {
    common::init_tracing();
    let cache = Arc::new(RecordingCache::default());
    let router = sample_router(cache.clone()).with_cache_disabled(true);

    assert_eq!(router.dispatch(&("GET", "/user/7")).status(), 200);
    assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_blob_is_replaced_on_load() {
    common::init_tracing();
    let cache = Arc::new(MemoryCache::new());
    cache.set(DEFAULT_CACHE_KEY, b"not a table blob".to_vec());

    let router = sample_router(cache.clone());
    assert_eq!(router.dispatch(&("GET", "/user/3")).status(), 200);

    // The garbage entry was overwritten with a decodable one.
    let bytes = cache.get(DEFAULT_CACHE_KEY).expect("entry present");
    assert_ne!(bytes, b"not a table blob".to_vec());
    let reloaded = sample_router(cache);
    assert_eq!(reloaded.dispatch(&("GET", "/user/4")).status(), 200);
}

#[test]
fn broken_backend_degrades_to_in_process_build() {
    common::init_tracing();
    let router = sample_router(Arc::new(FailingCache));

    let result = router.dispatch(&("GET", "/user/9"));
    assert_eq!(result.status(), 200);
    assert_eq!(result.attribute("id"), Some("9"));
}

#[test]
fn refresh_cache_works_while_disabled() {
    common::init_tracing();
    let cache = Arc::new(MemoryCache::new());
    let router = sample_router(cache.clone()).with_cache_disabled(true);

    assert!(router.refresh_cache());
    assert!(cache.has(DEFAULT_CACHE_KEY));
}

#[test]
fn refresh_cache_publishes_new_routes_to_the_shared_entry() {
    common::init_tracing();
    let cache = Arc::new(MemoryCache::new());
    sample_router(cache.clone()).dispatch(&("GET", "/user/1"));

    // The entry is stale with respect to a router that knows more routes
    // until that router refreshes it.
    let mut updated = sample_router(cache.clone());
    updated.get("/health", "health".to_string()).expect("add");
    assert!(updated.refresh_cache());

    let reader: CachedRouter<String> = CachedRouter::new(cache);
    assert_eq!(reader.dispatch(&("GET", "/health")).status(), 200);
}

#[test]
fn custom_cache_key_is_honored() {
    common::init_tracing();
    let cache = Arc::new(MemoryCache::new());
    let mut router: CachedRouter<String> = CachedRouter::with_key(cache.clone(), "edge_routes");
    router.get("/ping", "ping".to_string()).expect("add");

    router.dispatch(&("GET", "/ping"));
    assert!(cache.has("edge_routes"));
    assert!(!cache.has(DEFAULT_CACHE_KEY));
}

#[test]
fn group_routes_survive_the_blob_round_trip() {
    common::init_tracing();
    let cache = Arc::new(MemoryCache::new());
    let mut writer: CachedRouter<String> = CachedRouter::new(cache.clone());
    writer
        .add_group(
            "/api/v1",
            vec![
                Route::new(&["GET"], "/items/{id}", "get_item".to_string()),
                Route::new(&["GET", "POST"], "/items", "items".to_string()),
            ],
        )
        .expect("add_group");
    assert!(writer.refresh_cache());

    let reader: CachedRouter<String> = CachedRouter::new(cache);
    let result = reader.dispatch(&("GET", "/api/v1/items/5"));
    assert_eq!(result.status(), 200);
    assert_eq!(result.attribute("id"), Some("5"));
    assert_eq!(reader.dispatch(&("DELETE", "/api/v1/items")).status(), 405);
}

#[test]
fn per_route_matcher_round_trips_through_the_cache() {
    common::init_tracing();
    let cache = Arc::new(MemoryCache::new());
    let writer = sample_router(cache.clone()).with_matcher(MatcherKind::PerRoute);
    writer.dispatch(&("GET", "/user/1"));

    let reader: CachedRouter<String> = CachedRouter::new(cache);
    assert_eq!(reader.dispatch(&("GET", "/user/8")).attribute("id"), Some("8"));
}

#[test]
fn file_backed_cache_round_trips_between_routers() {
    common::init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = Arc::new(FileCache {
        dir: dir.path().to_path_buf(),
    });

    sample_router(cache.clone()).dispatch(&("GET", "/user/1"));
    assert!(cache.has(DEFAULT_CACHE_KEY));

    let reader = sample_router(cache);
    let result = reader.dispatch(&("GET", "/user/21"));
    assert_eq!(result.status(), 200);
    assert_eq!(result.attribute("id"), Some("21"));
}
