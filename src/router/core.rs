use http::Method;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::dispatcher::{DispatchResult, MatchOutcome};
use crate::table::{DispatchTable, MatcherKind, Route, RouteBuilder, ValidationError};

/// Cache key used by [`CachedRouter`] when none is given.
pub const DEFAULT_CACHE_KEY: &str = "router_data";

/// Minimal request view the router consumes: a method and a path.
///
/// The path may be in absolute-URL form; the router reduces it to its path
/// component before matching.
pub trait Request {
    /// HTTP method string, e.g. `"GET"`.
    fn method(&self) -> &str;
    /// Request path or absolute-form target.
    fn path(&self) -> &str;
}

/// `("GET", "/users/1")` style requests, mainly for tests and examples.
impl Request for (&str, &str) {
    fn method(&self) -> &str {
        self.0
    }

    fn path(&self) -> &str {
        self.1
    }
}

impl<T> Request for http::Request<T> {
    fn method(&self) -> &str {
        self.method().as_str()
    }

    fn path(&self) -> &str {
        self.uri().path()
    }
}

/// Router construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterConfig {
    /// Matcher engine for dynamic routes.
    pub matcher: MatcherKind,
}

/// Shared dispatch logic for both router flavors.
fn dispatch_on<'t, H>(
    table: &'t DispatchTable<H>,
    request: &impl Request,
) -> DispatchResult<'t, H> {
    let raw = Request::method(request);
    let Ok(method) = Method::from_bytes(raw.as_bytes()) else {
        // Not even a valid HTTP token; nothing can be registered under it.
        debug!(method = %raw, "unparseable request method");
        return DispatchResult::not_found();
    };
    table.dispatch(&method, Request::path(request)).into()
}

macro_rules! verb_methods {
    ($($name:ident => $method:literal),+ $(,)?) => {
        $(
            #[doc = concat!("Register a ", $method, " route.")]
            ///
            /// # Errors
            ///
            /// [`ValidationError`] when the pattern is invalid.
            pub fn $name(&mut self, pattern: &str, handler: H) -> Result<&mut Self, ValidationError> {
                self.add(&[$method], pattern, handler)
            }
        )+
    };
}

/// HTTP request router: register routes during the build phase, then
/// dispatch requests against the frozen table.
///
/// The dispatch table is compiled lazily on the first [`dispatch`](Router::dispatch)
/// call and reused for every subsequent one; registering another route
/// discards the compiled table so the next dispatch rebuilds it.
///
/// # Example
///
/// ```
/// use rapidroute::Router;
///
/// # fn main() -> Result<(), rapidroute::ValidationError> {
/// let mut router = Router::new();
/// router
///     .get(r"/users/{id:\d+}", "get_user")?
///     .post("/users", "create_user")?;
///
/// let result = router.dispatch(&("GET", "/users/42"));
/// assert_eq!(result.status(), 200);
/// assert_eq!(result.attribute("id"), Some("42"));
/// assert_eq!(result.handler(), Some(&"get_user"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Router<H> {
    builder: RouteBuilder<H>,
    table: OnceCell<DispatchTable<H>>,
}

impl<H: Clone> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> Router<H> {
    /// Create an empty router with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create an empty router with explicit configuration.
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Router {
            builder: RouteBuilder::with_matcher(config.matcher),
            table: OnceCell::new(),
        }
    }

    /// Create a router pre-loaded with a route list.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Route`] naming the index of the first invalid
    /// route; no router is produced.
    pub fn with_routes(routes: Vec<Route<H>>) -> Result<Self, ValidationError> {
        let mut router = Self::new();
        router.add_all(routes)?;
        Ok(router)
    }

    /// Register a route for the given methods (fluent).
    ///
    /// # Errors
    ///
    /// [`ValidationError`] when `methods` is empty, contains an unrecognized
    /// method, or the pattern is invalid. The route table is left unchanged
    /// on failure.
    pub fn add(
        &mut self,
        methods: &[&str],
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, ValidationError> {
        self.table.take();
        self.builder.add_route(methods, pattern, handler)?;
        Ok(self)
    }

    /// Register a group of routes under a common prefix (fluent).
    ///
    /// Atomic: if any contained route is invalid, none are registered and
    /// the error names the failing index.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Route`] wrapping the failing sub-route's error.
    pub fn add_group(
        &mut self,
        prefix: &str,
        routes: Vec<Route<H>>,
    ) -> Result<&mut Self, ValidationError> {
        self.table.take();
        self.builder.add_group(prefix, routes)?;
        Ok(self)
    }

    verb_methods! {
        connect => "CONNECT",
        delete => "DELETE",
        get => "GET",
        head => "HEAD",
        options => "OPTIONS",
        patch => "PATCH",
        post => "POST",
        purge => "PURGE",
        put => "PUT",
        trace => "TRACE",
    }

    /// Dispatch a request, building the table on first use.
    ///
    /// Never fails: not-found and method-not-allowed are values in the
    /// returned [`DispatchResult`], not errors.
    pub fn dispatch(&self, request: &impl Request) -> DispatchResult<'_, H> {
        dispatch_on(self.table(), request)
    }

    /// Match a method and path directly, returning the raw [`MatchOutcome`].
    pub fn route(&self, method: &Method, path: &str) -> MatchOutcome<'_, H> {
        self.table().dispatch(method, path)
    }

    /// The compiled dispatch table, building it if necessary.
    pub fn table(&self) -> &DispatchTable<H> {
        self.table.get_or_init(|| self.builder.clone().build())
    }

    // Constructor-time registration; the partially filled router is dropped
    // on error, so per-route atomicity is enough here.
    fn add_all(&mut self, routes: Vec<Route<H>>) -> Result<(), ValidationError> {
        for (index, route) in routes.into_iter().enumerate() {
            let methods: Vec<&str> = route.methods.iter().map(String::as_str).collect();
            self.builder
                .add_route(&methods, &route.pattern, route.handler)
                .map_err(|source| ValidationError::Route {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}

/// Cache-backed router: persists the compiled dispatch table through a
/// [`Cache`] backend so later process invocations skip recompilation.
///
/// Cache behavior on dispatch:
///
/// - caching disabled — always build in-process, never touch the backend
/// - caching enabled — try `get`; on a miss or an invalid blob, refresh the
///   cache and retry; if the entry is still unusable, build in-process
///   without persisting (degrade gracefully rather than fail the request
///   path)
///
/// [`refresh_cache`](CachedRouter::refresh_cache) remains usable with
/// caching disabled; it is an explicit operator action after route
/// definitions change. The entry under `cache_key` is shared by every
/// router using the same backend and key; concurrent refreshes are safe
/// because the table is derived and reproducible (last writer wins).
pub struct CachedRouter<H> {
    builder: RouteBuilder<H>,
    cache: Arc<dyn Cache>,
    cache_key: String,
    cache_disabled: bool,
    table: OnceCell<DispatchTable<H>>,
}

impl<H: Clone> CachedRouter<H> {
    /// Create an empty cache-backed router storing its table under
    /// [`DEFAULT_CACHE_KEY`].
    #[must_use]
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self::with_key(cache, DEFAULT_CACHE_KEY)
    }

    /// Create an empty cache-backed router with an explicit cache key.
    #[must_use]
    pub fn with_key(cache: Arc<dyn Cache>, cache_key: impl Into<String>) -> Self {
        CachedRouter {
            builder: RouteBuilder::new(),
            cache,
            cache_key: cache_key.into(),
            cache_disabled: false,
            table: OnceCell::new(),
        }
    }

    /// Select the matcher engine.
    #[must_use]
    pub fn with_matcher(mut self, matcher: MatcherKind) -> Self {
        self.builder.set_matcher(matcher);
        self
    }

    /// Disable cache use for dispatch. `refresh_cache` still works.
    #[must_use]
    pub fn with_cache_disabled(mut self, disabled: bool) -> Self {
        self.cache_disabled = disabled;
        self
    }

    /// Register a route for the given methods (fluent).
    ///
    /// # Errors
    ///
    /// Same contract as [`Router::add`].
    pub fn add(
        &mut self,
        methods: &[&str],
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, ValidationError> {
        self.table.take();
        self.builder.add_route(methods, pattern, handler)?;
        Ok(self)
    }

    /// Register a group of routes under a common prefix (fluent).
    ///
    /// # Errors
    ///
    /// Same contract as [`Router::add_group`].
    pub fn add_group(
        &mut self,
        prefix: &str,
        routes: Vec<Route<H>>,
    ) -> Result<&mut Self, ValidationError> {
        self.table.take();
        self.builder.add_group(prefix, routes)?;
        Ok(self)
    }

    verb_methods! {
        connect => "CONNECT",
        delete => "DELETE",
        get => "GET",
        head => "HEAD",
        options => "OPTIONS",
        patch => "PATCH",
        post => "POST",
        purge => "PURGE",
        put => "PUT",
        trace => "TRACE",
    }
}

impl<H> CachedRouter<H>
where
    H: Clone + Serialize + DeserializeOwned,
{
    /// Rebuild the dispatch table from current registrations and store it in
    /// the cache, regardless of the disable flag.
    ///
    /// Returns the backend's success indicator; serialization failures read
    /// as `false`.
    pub fn refresh_cache(&self) -> bool {
        let table = self.builder.clone().build();
        let bytes = match table.to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(cache_key = %self.cache_key, error = %err, "dispatch table failed to serialize");
                return false;
            }
        };
        info!(cache_key = %self.cache_key, bytes = bytes.len(), "dispatch table cached");
        self.cache.set(&self.cache_key, bytes)
    }

    /// Dispatch a request against the cached (or freshly built) table.
    ///
    /// Never fails; cache-layer problems degrade to an in-process rebuild.
    pub fn dispatch(&self, request: &impl Request) -> DispatchResult<'_, H> {
        dispatch_on(self.table(), request)
    }

    /// Match a method and path directly, returning the raw [`MatchOutcome`].
    pub fn route(&self, method: &Method, path: &str) -> MatchOutcome<'_, H> {
        self.table().dispatch(method, path)
    }

    /// The dispatch table this router dispatches against, loading it from
    /// the cache (or building it) on first use.
    pub fn table(&self) -> &DispatchTable<H> {
        self.table.get_or_init(|| self.load_table())
    }

    fn load_table(&self) -> DispatchTable<H> {
        if !self.cache_disabled {
            if let Some(table) = self.fetch_cached() {
                return table;
            }
            self.refresh_cache();
            if let Some(table) = self.fetch_cached() {
                return table;
            }
            warn!(
                cache_key = %self.cache_key,
                "cache unusable after refresh; building dispatch table in-process"
            );
        }
        self.builder.clone().build()
    }

    fn fetch_cached(&self) -> Option<DispatchTable<H>> {
        let bytes = self.cache.get(&self.cache_key)?;
        match DispatchTable::from_bytes(&bytes) {
            Ok(table) => {
                debug!(cache_key = %self.cache_key, "dispatch table cache hit");
                Some(table)
            }
            Err(err) => {
                warn!(cache_key = %self.cache_key, error = %err, "invalid dispatch table blob");
                None
            }
        }
    }
}
