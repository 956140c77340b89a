//! # Cache Module
//!
//! The byte-blob cache abstraction used by
//! [`CachedRouter`](crate::router::CachedRouter) to persist compiled
//! dispatch tables between process invocations, and an in-memory backend.
//!
//! Cache entries are derived, reproducible data: two processes racing to
//! refresh the same key is fine (last writer wins), and a lost or corrupt
//! entry only costs a rebuild. Staleness detection is the caller's job —
//! call `refresh_cache` after changing route definitions.

mod core;

pub use core::{Cache, MemoryCache};
