//! # Pattern Module
//!
//! Route-pattern parsing and normalization.
//!
//! A route pattern is literal text interleaved with named placeholders:
//!
//! - `/users/{id}` — placeholder with the default `[^/]+` regex
//! - `/users/{id:\d+}` — placeholder with a custom regex
//! - `/files[/{path:.+}]` — optional trailing part, desugared into one
//!   variant per omitted suffix (`/files` and `/files/{path:.+}`)
//!
//! ## Normalization
//!
//! Patterns are normalized before parsing: surrounding whitespace and slashes
//! are stripped and a single leading slash is re-added, so `/foo/`, `foo` and
//! `/foo` all denote the same route. Request paths go through the same
//! normalization before matching.
//!
//! ## Invariants
//!
//! - Placeholder regexes may not contain capturing groups; placeholder values
//!   are extracted by capture-group index, so a stray group would shift every
//!   index after it. Non-capturing `(?:...)` groups are fine.
//! - Optional parts may only appear as a contiguous suffix of the pattern.
//! - A placeholder name may appear at most once per pattern.
//!
//! All violations are reported as [`PatternError`] at registration time,
//! never at dispatch time.

mod core;
#[cfg(test)]
mod tests;

pub use core::{PatternError, PatternVariant, RoutePattern, Segment, DEFAULT_PLACEHOLDER_REGEX};
pub(crate) use core::normalize_pattern;
