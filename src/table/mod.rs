//! # Table Module
//!
//! Route table building and the immutable dispatch table.
//!
//! ## Overview
//!
//! [`RouteBuilder`] accumulates `(methods, pattern, handler)` registrations
//! during the build phase; [`RouteBuilder::build`] consumes it and produces a
//! [`DispatchTable`], the frozen structure `dispatch` runs against.
//!
//! ## Two-phase matching structure
//!
//! - **Static routes** — pattern variants with no placeholders are stored in
//!   a per-method map keyed by the literal path and answered by direct
//!   lookup.
//! - **Dynamic routes** — placeholder-bearing variants compile to one
//!   capturing regex each, combined per method into anchored alternation
//!   chunks of at most [`COMBINED_CHUNK_CAPACITY`] routes. Chunk scan order
//!   equals registration order, which makes "first registered wins" hold
//!   across chunk boundaries.
//!
//! The alternation trick relies on two invariants: placeholder regexes carry
//! no capturing groups (enforced at parse time), so each route owns a known
//! contiguous capture-group range; and the regex engine's leftmost-first
//! alternation semantics, so the earliest-registered alternative that can
//! match is the one that does.
//!
//! ## Persistence
//!
//! A table serializes to a self-describing JSON blob
//! ([`DispatchTable::to_bytes`]) and rehydrates with full re-validation
//! ([`DispatchTable::from_bytes`]); a blob of the wrong shape reads as a
//! [`BlobError`], which the cache layer treats the same as an absent entry.

mod builder;
mod core;
mod error;

pub use builder::{Route, RouteBuilder};
pub use core::{DispatchTable, MatcherKind, COMBINED_CHUNK_CAPACITY, VALID_HTTP_METHODS};
pub use error::{BlobError, ValidationError};
