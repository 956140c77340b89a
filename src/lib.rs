//! # rapidroute
//!
//! A fast HTTP request router: routes are registered as `(methods, pattern,
//! handler)` triples, compiled into a compact matching structure, and each
//! incoming request resolves to one of three outcomes — matched (with the
//! handler and extracted placeholder values), not found, or method not
//! allowed (with the methods that would have matched).
//!
//! ## Patterns
//!
//! Patterns mix literal text with named placeholders and optional suffixes:
//!
//! ```text
//! /users/{id}              placeholder, default [^/]+ regex
//! /users/{id:\d+}          placeholder with a custom regex
//! /files[/{path:.+}]       optional trailing part
//! ```
//!
//! ## Architecture
//!
//! - **[`pattern`]** — pattern parsing, normalization and desugaring
//! - **[`table`]** — route table building: static literal maps plus
//!   chunked combined-regex matchers, and the serialization blob used for
//!   cache persistence
//! - **[`dispatcher`]** — the match algorithm and the outcome/result types
//! - **[`cache`]** — the byte-blob cache abstraction and an in-memory backend
//! - **[`router`]** — the fluent public surface: [`Router`] and
//!   [`CachedRouter`]
//!
//! ## Example
//!
//! ```
//! use rapidroute::Router;
//!
//! # fn main() -> Result<(), rapidroute::ValidationError> {
//! let mut router = Router::new();
//! router
//!     .add(&["GET", "POST"], "/users", "users_collection")?
//!     .get(r"/users/{id:\d+}", "get_user")?;
//!
//! let result = router.dispatch(&("PUT", "/users"));
//! assert_eq!(result.status(), 405);
//! assert!(result.allowed().contains(&http::Method::POST));
//! # Ok(())
//! # }
//! ```
//!
//! ## Handler payloads
//!
//! Handlers are opaque to the router: any `Clone` value is carried through
//! and returned by reference on a match. [`CachedRouter`] additionally needs
//! handlers to be `Serialize + DeserializeOwned` so the compiled table can
//! round-trip through the cache.

pub mod cache;
pub mod dispatcher;
pub mod pattern;
pub mod router;
pub mod table;

pub use cache::{Cache, MemoryCache};
pub use dispatcher::{DispatchResult, MatchOutcome, ParamVec};
pub use pattern::{PatternError, RoutePattern};
pub use router::{CachedRouter, Request, Router, RouterConfig, DEFAULT_CACHE_KEY};
pub use table::{
    BlobError, DispatchTable, MatcherKind, Route, RouteBuilder, ValidationError,
    VALID_HTTP_METHODS,
};
