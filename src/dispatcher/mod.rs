//! # Dispatcher Module
//!
//! The match algorithm over a frozen [`DispatchTable`](crate::table::DispatchTable)
//! and the result value types.
//!
//! ## Outcomes
//!
//! `dispatch` is a pure, synchronous, terminating computation with three
//! normal outcomes, expressed as [`MatchOutcome`]:
//!
//! - `Found` — handler plus extracted placeholder attributes
//! - `NotFound` — the path matches no route under any method
//! - `MethodNotAllowed` — the path matches under other methods; carries the
//!   set that would have matched, for a `405` `Allow:` header
//!
//! Misses are cheap values, not errors: callers turn them into 404/405
//! responses. [`DispatchResult`] is the uniform projection (status, allowed
//! methods, attributes, handler) of an outcome; the GET-implies-HEAD rule
//! for allowed-method reporting is applied there, in one place.
//!
//! ## Tie-breaking
//!
//! When several patterns registered for one method match the same path, the
//! first one registered wins. Static routes are consulted before dynamic
//! ones; dynamic chunks are scanned in registration order and alternation
//! order inside a chunk is registration order too.

mod core;

pub use core::{DispatchResult, MatchOutcome, ParamVec, MAX_INLINE_ATTRIBUTES};
