use http::Method;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::error::{BlobError, ValidationError};

/// The closed set of HTTP methods a route may be registered for.
///
/// Matching is case-sensitive: `"get"` is rejected, `"GET"` is accepted.
pub const VALID_HTTP_METHODS: [&str; 10] = [
    "CONNECT", "DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PURGE", "PUT", "TRACE",
];

/// Routes per combined regex in [`MatcherKind::Combined`] mode.
///
/// Keeps the capturing-group count of any single compiled regex bounded,
/// which matters for engines with per-pattern group limits and keeps compile
/// times predictable as route counts grow.
pub const COMBINED_CHUNK_CAPACITY: usize = 10;

/// Matcher engine selection for dynamic routes.
///
/// An enumerated configuration value mapped through a static capacity table;
/// there is deliberately no string-named engine lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatcherKind {
    /// Combine up to [`COMBINED_CHUNK_CAPACITY`] routes into one anchored
    /// alternation regex per chunk. The default.
    #[default]
    Combined,
    /// One regex per route, scanned linearly. Slower per dispatch but the
    /// simplest possible matcher; useful when debugging pattern behavior.
    PerRoute,
}

impl MatcherKind {
    pub(crate) fn chunk_capacity(self) -> usize {
        match self {
            MatcherKind::Combined => COMBINED_CHUNK_CAPACITY,
            MatcherKind::PerRoute => 1,
        }
    }
}

/// Validate a method string against the recognized set.
pub(crate) fn parse_method(raw: &str) -> Result<Method, ValidationError> {
    if !VALID_HTTP_METHODS.contains(&raw) {
        return Err(ValidationError::UnrecognizedMethod {
            method: raw.to_string(),
        });
    }
    // PURGE is not a named constant in `http`, so every method goes through
    // the extension constructor.
    Method::from_bytes(raw.as_bytes()).map_err(|_| ValidationError::UnrecognizedMethod {
        method: raw.to_string(),
    })
}

/// One dynamic route inside a chunk: the opaque handler, its placeholder
/// names in declaration order, and the index of its first capture group
/// within the chunk regex.
#[derive(Debug, Clone)]
pub(crate) struct DynamicRoute<H> {
    pub(crate) handler: H,
    pub(crate) names: Vec<Arc<str>>,
    pub(crate) first_group: usize,
}

/// A combined-regex chunk covering a slice of a method's dynamic routes in
/// registration order.
#[derive(Debug, Clone)]
pub(crate) struct RouteChunk<H> {
    pub(crate) regex: Regex,
    pub(crate) routes: Vec<DynamicRoute<H>>,
}

impl<H> RouteChunk<H> {
    /// Build a chunk from `(regex body, names, handler)` triples.
    ///
    /// Bodies were compile-checked piecewise at pattern-parse time, so the
    /// combined alternation compiling is an internal invariant.
    pub(crate) fn combine(routes: Vec<(String, Vec<Arc<str>>, H)>) -> Self {
        let mut source = String::from("^(?:");
        let mut compiled = Vec::with_capacity(routes.len());
        let mut next_group = 1usize;
        for (i, (body, names, handler)) in routes.into_iter().enumerate() {
            if i > 0 {
                source.push('|');
            }
            source.push_str(&body);
            let first_group = next_group;
            next_group += names.len();
            compiled.push(DynamicRoute {
                handler,
                names,
                first_group,
            });
        }
        source.push_str(")$");
        #[allow(clippy::expect_used)]
        let regex = Regex::new(&source).expect("failed to compile chunk regex");
        RouteChunk {
            regex,
            routes: compiled,
        }
    }
}

/// The immutable compiled structure used to answer match queries.
///
/// Built once by [`RouteBuilder::build`](crate::table::RouteBuilder::build)
/// (or rehydrated from a cache blob) and read-only thereafter: safe for
/// unlimited concurrent `dispatch` calls from multiple threads without
/// locking.
///
/// Static routes (no placeholders) live in a per-method literal-path map;
/// dynamic routes are grouped per method into combined-regex chunks whose
/// scan order equals registration order, so the first-registered route wins
/// ambiguous overlaps even across chunk boundaries.
#[derive(Debug, Clone)]
pub struct DispatchTable<H> {
    /// Methods in first-registration order, the iteration order for
    /// allowed-method reporting.
    pub(crate) method_order: Vec<Method>,
    pub(crate) static_routes: HashMap<Method, HashMap<String, H>>,
    pub(crate) dynamic_routes: HashMap<Method, Vec<RouteChunk<H>>>,
}

impl<H> DispatchTable<H> {
    /// Number of registered route entries (static paths plus dynamic routes,
    /// counted per method).
    #[must_use]
    pub fn len(&self) -> usize {
        let static_count: usize = self.static_routes.values().map(HashMap::len).sum();
        let dynamic_count: usize = self
            .dynamic_routes
            .values()
            .flat_map(|chunks| chunks.iter())
            .map(|chunk| chunk.routes.len())
            .sum();
        static_count + dynamic_count
    }

    /// `true` when no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.method_order.is_empty()
    }
}

/// Format version stamped into serialized tables. Bump on layout changes so
/// stale cache entries read as invalid instead of misbehaving.
const BLOB_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct DynamicRouteBlob<H> {
    handler: H,
    names: Vec<String>,
    first_group: usize,
}

#[derive(Serialize, Deserialize)]
struct ChunkBlob<H> {
    regex: String,
    routes: Vec<DynamicRouteBlob<H>>,
}

/// Self-describing serialized form of a [`DispatchTable`].
#[derive(Serialize, Deserialize)]
struct TableBlob<H> {
    format: u32,
    method_order: Vec<String>,
    static_routes: HashMap<String, HashMap<String, H>>,
    dynamic_routes: HashMap<String, Vec<ChunkBlob<H>>>,
}

impl<H: Serialize + Clone> DispatchTable<H> {
    /// Serialize the table for cache persistence.
    ///
    /// # Errors
    ///
    /// Fails only when the handler type's `Serialize` implementation fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BlobError> {
        let blob = TableBlob {
            format: BLOB_FORMAT_VERSION,
            method_order: self.method_order.iter().map(|m| m.to_string()).collect(),
            static_routes: self
                .static_routes
                .iter()
                .map(|(method, paths)| (method.to_string(), paths.clone()))
                .collect(),
            dynamic_routes: self
                .dynamic_routes
                .iter()
                .map(|(method, chunks)| {
                    let chunks = chunks
                        .iter()
                        .map(|chunk| ChunkBlob {
                            regex: chunk.regex.as_str().to_string(),
                            routes: chunk
                                .routes
                                .iter()
                                .map(|route| DynamicRouteBlob {
                                    handler: route.handler.clone(),
                                    names: route.names.iter().map(|n| n.to_string()).collect(),
                                    first_group: route.first_group,
                                })
                                .collect(),
                        })
                        .collect();
                    (method.to_string(), chunks)
                })
                .collect(),
        };
        Ok(serde_json::to_vec(&blob)?)
    }
}

impl<H: DeserializeOwned> DispatchTable<H> {
    /// Rehydrate a table from cache bytes, recompiling every chunk regex and
    /// re-validating method names.
    ///
    /// # Errors
    ///
    /// Any structural problem — undecodable bytes, unknown format version,
    /// invalid method, uncompilable regex — is reported as a [`BlobError`]
    /// so callers can fall back to an in-process rebuild.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlobError> {
        let blob: TableBlob<H> = serde_json::from_slice(bytes)?;
        if blob.format != BLOB_FORMAT_VERSION {
            return Err(BlobError::FormatVersion { found: blob.format });
        }

        let blob_method = |raw: &str| -> Result<Method, BlobError> {
            parse_method(raw).map_err(|_| BlobError::Method {
                method: raw.to_string(),
            })
        };

        let mut method_order = Vec::with_capacity(blob.method_order.len());
        for raw in &blob.method_order {
            method_order.push(blob_method(raw)?);
        }

        let mut static_routes = HashMap::with_capacity(blob.static_routes.len());
        for (raw, paths) in blob.static_routes {
            static_routes.insert(blob_method(&raw)?, paths);
        }

        let mut dynamic_routes = HashMap::with_capacity(blob.dynamic_routes.len());
        for (raw, chunks) in blob.dynamic_routes {
            let method = blob_method(&raw)?;
            let mut compiled = Vec::with_capacity(chunks.len());
            for chunk in chunks {
                let regex = Regex::new(&chunk.regex).map_err(|err| BlobError::Regex {
                    message: err.to_string(),
                })?;
                compiled.push(RouteChunk {
                    regex,
                    routes: chunk
                        .routes
                        .into_iter()
                        .map(|route| DynamicRoute {
                            handler: route.handler,
                            names: route.names.into_iter().map(Arc::from).collect(),
                            first_group: route.first_group,
                        })
                        .collect(),
                });
            }
            dynamic_routes.insert(method, compiled);
        }

        debug!(
            methods = method_order.len(),
            "dispatch table rehydrated from cache blob"
        );

        Ok(DispatchTable {
            method_order,
            static_routes,
            dynamic_routes,
        })
    }
}
