use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::core::{parse_method, DispatchTable, MatcherKind, RouteChunk};
use super::error::ValidationError;
use crate::pattern::{normalize_pattern, PatternVariant, RoutePattern};

/// A route definition for group and constructor registration:
/// methods, pattern and the opaque handler payload.
#[derive(Debug, Clone)]
pub struct Route<H> {
    pub(crate) methods: Vec<String>,
    pub(crate) pattern: String,
    pub(crate) handler: H,
}

impl<H> Route<H> {
    /// Create a route definition.
    pub fn new(methods: &[&str], pattern: &str, handler: H) -> Self {
        Route {
            methods: methods.iter().map(|m| (*m).to_string()).collect(),
            pattern: pattern.to_string(),
            handler,
        }
    }
}

/// One registered entry of the working set: a single desugared pattern
/// variant with its methods and handler. A pattern with optional suffixes
/// contributes several entries sharing the same handler.
#[derive(Debug, Clone)]
struct RouteEntry<H> {
    methods: Vec<Method>,
    variant: PatternVariant,
    handler: H,
}

/// Accumulates route registrations and produces an immutable
/// [`DispatchTable`].
///
/// The builder is the mutable build-phase half of the router: it owns the
/// working route set exclusively, and [`build`](RouteBuilder::build) consumes
/// it, transferring ownership into the frozen table. The build phase is
/// single-threaded by design; the resulting table is freely shareable.
#[derive(Debug, Clone)]
pub struct RouteBuilder<H> {
    matcher: MatcherKind,
    entries: Vec<RouteEntry<H>>,
}

impl<H: Clone> Default for RouteBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> RouteBuilder<H> {
    /// Create an empty builder using the default [`MatcherKind::Combined`]
    /// engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_matcher(MatcherKind::default())
    }

    /// Create an empty builder with an explicit matcher engine.
    #[must_use]
    pub fn with_matcher(matcher: MatcherKind) -> Self {
        RouteBuilder {
            matcher,
            entries: Vec::new(),
        }
    }

    /// Switch the matcher engine; registered routes are kept.
    pub fn set_matcher(&mut self, matcher: MatcherKind) {
        self.matcher = matcher;
    }

    /// Number of desugared route entries registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a route for the given methods.
    ///
    /// Appends one working entry per desugared pattern variant. The call is
    /// atomic: on any validation failure nothing is appended.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] when `methods` is empty or contains a value
    /// outside the recognized set, or when the pattern fails to parse.
    pub fn add_route(
        &mut self,
        methods: &[&str],
        pattern: &str,
        handler: H,
    ) -> Result<(), ValidationError> {
        let entries = self.compile_route(methods, pattern, handler)?;
        self.entries.extend(entries);
        Ok(())
    }

    /// Register a group of routes under a common prefix.
    ///
    /// The prefix is normalized like a pattern and prepended to each
    /// sub-pattern; the composed pattern is re-validated in full. The group
    /// is atomic: if any contained route is invalid, none are added and the
    /// error names the failing index.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Route`] wrapping the failing sub-route's error.
    pub fn add_group(
        &mut self,
        prefix: &str,
        routes: Vec<Route<H>>,
    ) -> Result<(), ValidationError> {
        let prefix = normalize_pattern(prefix);
        let mut staged = Vec::new();
        for (index, route) in routes.into_iter().enumerate() {
            let methods: Vec<&str> = route.methods.iter().map(String::as_str).collect();
            let composed = compose_pattern(&prefix, &route.pattern);
            let entries = self
                .compile_route(&methods, &composed, route.handler)
                .map_err(|source| ValidationError::Route {
                    index,
                    source: Box::new(source),
                })?;
            staged.extend(entries);
        }
        self.entries.extend(staged);
        Ok(())
    }

    /// Validate one registration into its working entries without touching
    /// the builder state.
    fn compile_route(
        &self,
        methods: &[&str],
        pattern: &str,
        handler: H,
    ) -> Result<Vec<RouteEntry<H>>, ValidationError> {
        if methods.is_empty() {
            return Err(ValidationError::NoMethods);
        }
        let methods = methods
            .iter()
            .copied()
            .map(parse_method)
            .collect::<Result<Vec<_>, _>>()?;
        let compiled =
            RoutePattern::parse(pattern).map_err(|source| ValidationError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(compiled
            .variants()
            .iter()
            .map(|variant| RouteEntry {
                methods: methods.clone(),
                variant: variant.clone(),
                handler: handler.clone(),
            })
            .collect())
    }

    /// Freeze the working set into an immutable [`DispatchTable`].
    ///
    /// Entries are partitioned into static (no placeholders, literal-path
    /// map, first registration wins) and dynamic (per-method combined-regex
    /// chunks sized by the matcher engine, registration order preserved
    /// within and across chunks).
    #[must_use]
    pub fn build(self) -> DispatchTable<H> {
        let chunk_capacity = self.matcher.chunk_capacity();
        let mut method_order: Vec<Method> = Vec::new();
        let mut static_routes: HashMap<Method, HashMap<String, H>> = HashMap::new();
        let mut dynamic: HashMap<Method, Vec<(String, Vec<Arc<str>>, H)>> = HashMap::new();

        for entry in &self.entries {
            for method in &entry.methods {
                if !method_order.contains(method) {
                    method_order.push(method.clone());
                }
                if let Some(path) = entry.variant.literal_path() {
                    // First registration wins; a duplicate literal is ignored.
                    static_routes
                        .entry(method.clone())
                        .or_default()
                        .entry(path)
                        .or_insert_with(|| entry.handler.clone());
                } else {
                    dynamic.entry(method.clone()).or_default().push((
                        entry.variant.regex_body(),
                        entry.variant.placeholder_names(),
                        entry.handler.clone(),
                    ));
                }
            }
        }

        let mut dynamic_routes: HashMap<Method, Vec<RouteChunk<H>>> = HashMap::new();
        for (method, routes) in dynamic {
            let mut chunks = Vec::with_capacity(routes.len().div_ceil(chunk_capacity));
            let mut pending = Vec::with_capacity(chunk_capacity);
            for route in routes {
                pending.push(route);
                if pending.len() == chunk_capacity {
                    chunks.push(RouteChunk::combine(std::mem::take(&mut pending)));
                }
            }
            if !pending.is_empty() {
                chunks.push(RouteChunk::combine(pending));
            }
            dynamic_routes.insert(method, chunks);
        }

        let table = DispatchTable {
            method_order,
            static_routes,
            dynamic_routes,
        };

        info!(
            routes_count = self.entries.len(),
            methods = table.method_order.len(),
            static_count = table.static_routes.values().map(HashMap::len).sum::<usize>(),
            chunks = table
                .dynamic_routes
                .values()
                .map(Vec::len)
                .sum::<usize>(),
            matcher = ?self.matcher,
            "dispatch table built"
        );

        table
    }
}

/// Join a normalized prefix and a raw sub-pattern into one composed pattern.
fn compose_pattern(prefix: &str, pattern: &str) -> String {
    let trimmed = pattern.trim_matches(|c| c == ' ' || c == '/');
    if trimmed.is_empty() {
        prefix.to_string()
    } else if prefix == "/" {
        format!("/{trimmed}")
    } else {
        format!("{prefix}/{trimmed}")
    }
}
