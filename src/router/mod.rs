//! # Router Module
//!
//! The public router surface: fluent registration, per-verb helpers, and
//! request dispatch.
//!
//! Two flavors share the same registration API:
//!
//! - [`Router`] — compiles its dispatch table in-process on first dispatch.
//! - [`CachedRouter`] — additionally persists the compiled table through a
//!   [`Cache`](crate::cache::Cache) backend keyed by a cache key, so
//!   subsequent process invocations rehydrate instead of recompiling.
//!
//! Registration errors are loud and immediate (fail fast at startup);
//! dispatch misses are cheap values the caller turns into 404/405 responses.
//!
//! ## Concurrency
//!
//! The build phase (`add`/`add_group`) takes `&mut self` and is expected
//! single-threaded. Once the table is frozen by the first `dispatch`, any
//! number of threads may dispatch concurrently through a shared reference.

mod core;

pub use core::{CachedRouter, Request, Router, RouterConfig, DEFAULT_CACHE_KEY};
