use http::{Method, StatusCode};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::pattern::normalize_pattern;
use crate::table::DispatchTable;

/// Maximum number of extracted attributes before heap allocation.
/// Most route patterns have well under 8 placeholders.
pub const MAX_INLINE_ATTRIBUTES: usize = 8;

/// Stack-allocated attribute storage for the dispatch hot path.
///
/// Attribute names are `Arc<str>` shared with the dispatch table (cloning is
/// an atomic increment, not a string copy); values are per-request data
/// extracted from the path. Order is placeholder declaration order.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_ATTRIBUTES]>;

/// Outcome of matching one request against the dispatch table.
///
/// All three cases are normal values: "no route" is expected in routing, not
/// exceptional, so dispatch has no error channel.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'t, H> {
    /// A route matched; carries its handler and extracted placeholder values.
    Found {
        /// Handler registered for the matched route
        handler: &'t H,
        /// Placeholder name/value pairs in declaration order
        attributes: ParamVec,
    },
    /// No route matched the path under any method.
    NotFound,
    /// The path matched under other methods, but not the requested one.
    MethodNotAllowed {
        /// Methods that would have matched, in first-registration order
        allowed: Vec<Method>,
    },
}

/// Uniform view of a [`MatchOutcome`], the shape callers turn into an HTTP
/// response.
///
/// A pure projection: status 200/404/405, the allowed methods (405 only,
/// with HEAD implied by GET), the extracted attributes (200 only) and the
/// handler (200 only).
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult<'t, H> {
    status: StatusCode,
    allowed: Vec<Method>,
    attributes: ParamVec,
    handler: Option<&'t H>,
}

impl<'t, H> DispatchResult<'t, H> {
    /// `200` for a match, `404` for no match, `405` for a method mismatch.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Allowed methods for a `405` result, suitable for an `Allow:` header.
    /// Empty for other statuses. When GET is allowed and HEAD was not
    /// explicitly registered, HEAD appears here implicitly.
    #[must_use]
    pub fn allowed(&self) -> &[Method] {
        &self.allowed
    }

    /// Extracted placeholder values in declaration order. Empty unless the
    /// status is `200`.
    #[must_use]
    pub fn attributes(&self) -> &ParamVec {
        &self.attributes
    }

    /// Look up an attribute by name. Last occurrence wins if a name repeats.
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// The matched route's handler; `None` unless the status is `200`.
    #[must_use]
    pub fn handler(&self) -> Option<&'t H> {
        self.handler
    }

    pub(crate) fn not_found() -> Self {
        DispatchResult {
            status: StatusCode::NOT_FOUND,
            allowed: Vec::new(),
            attributes: ParamVec::new(),
            handler: None,
        }
    }
}

impl<'t, H> From<MatchOutcome<'t, H>> for DispatchResult<'t, H> {
    fn from(outcome: MatchOutcome<'t, H>) -> Self {
        match outcome {
            MatchOutcome::Found {
                handler,
                attributes,
            } => DispatchResult {
                status: StatusCode::OK,
                allowed: Vec::new(),
                attributes,
                handler: Some(handler),
            },
            MatchOutcome::NotFound => DispatchResult::not_found(),
            MatchOutcome::MethodNotAllowed { mut allowed } => {
                // GET implies HEAD: a GET route answers HEAD requests, so a
                // 405 must advertise HEAD whenever it advertises GET.
                if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
                    allowed.push(Method::HEAD);
                }
                DispatchResult {
                    status: StatusCode::METHOD_NOT_ALLOWED,
                    allowed,
                    attributes: ParamVec::new(),
                    handler: None,
                }
            }
        }
    }
}

impl<H> DispatchTable<H> {
    /// Match a request method and path against the table.
    ///
    /// The path is normalized exactly like a route pattern; a path in
    /// absolute-URL form (`scheme://host/path`) is reduced to its path
    /// component first.
    ///
    /// Algorithm:
    ///
    /// 1. Direct lookup in the method's static routes.
    /// 2. Scan the method's dynamic chunks in registration order; within a
    ///    matching chunk the owning route is the one whose capture groups
    ///    participated, and its values are extracted positionally.
    /// 3. For HEAD, fall back to the GET routes (a GET route serves HEAD
    ///    unless HEAD was registered separately).
    /// 4. Otherwise collect every other method the path would match under;
    ///    a non-empty set is `MethodNotAllowed`, an empty one `NotFound`.
    #[must_use]
    pub fn dispatch(&self, method: &Method, path: &str) -> MatchOutcome<'_, H> {
        let path = normalize_request_path(path);
        debug!(method = %method, path = %path, "route match attempt");

        if let Some((handler, attributes)) = self.match_method(method, &path) {
            return MatchOutcome::Found {
                handler,
                attributes,
            };
        }

        if *method == Method::HEAD {
            if let Some((handler, attributes)) = self.match_method(&Method::GET, &path) {
                return MatchOutcome::Found {
                    handler,
                    attributes,
                };
            }
        }

        let mut allowed: Vec<Method> = Vec::new();
        for candidate in &self.method_order {
            if candidate == method {
                continue;
            }
            if self.match_method(candidate, &path).is_some() {
                allowed.push(candidate.clone());
            }
        }

        if allowed.is_empty() {
            debug!(method = %method, path = %path, "no route matched");
            MatchOutcome::NotFound
        } else {
            debug!(method = %method, path = %path, allowed = ?allowed, "method not allowed");
            MatchOutcome::MethodNotAllowed { allowed }
        }
    }

    /// Match a normalized path against one method's routes.
    fn match_method(&self, method: &Method, path: &str) -> Option<(&H, ParamVec)> {
        if let Some(paths) = self.static_routes.get(method) {
            if let Some(handler) = paths.get(path) {
                return Some((handler, ParamVec::new()));
            }
        }

        let chunks = self.dynamic_routes.get(method)?;
        for chunk in chunks {
            let Some(caps) = chunk.regex.captures(path) else {
                continue;
            };
            // Exactly one alternative of the chunk participated in the
            // match; its route is the one whose first group is present.
            for route in &chunk.routes {
                if caps.get(route.first_group).is_none() {
                    continue;
                }
                let mut attributes = ParamVec::new();
                for (offset, name) in route.names.iter().enumerate() {
                    let value = caps
                        .get(route.first_group + offset)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default();
                    attributes.push((Arc::clone(name), value));
                }
                return Some((&route.handler, attributes));
            }
        }
        None
    }
}

/// Reduce a request target to its normalized path: strip scheme and host
/// from absolute-form targets, then apply pattern normalization.
pub(crate) fn normalize_request_path(raw: &str) -> String {
    if raw.contains("://") {
        if let Ok(url) = Url::parse(raw) {
            return normalize_pattern(url.path());
        }
    }
    normalize_pattern(raw)
}
