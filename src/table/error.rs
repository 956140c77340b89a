use crate::pattern::PatternError;
use std::fmt;

/// Error raised when a route registration is malformed.
///
/// Registration errors are loud and immediate: they surface from `add`,
/// `add_group` and `with_routes` during application startup, never from
/// `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The method list for a route is empty.
    NoMethods,
    /// A method is not in the recognized HTTP method set.
    ///
    /// Methods are matched case-sensitively against
    /// [`VALID_HTTP_METHODS`](crate::table::VALID_HTTP_METHODS).
    UnrecognizedMethod {
        /// The rejected method string
        method: String,
    },
    /// The route pattern failed to parse.
    Pattern {
        /// The pattern as given by the caller
        pattern: String,
        /// Underlying parse failure
        source: PatternError,
    },
    /// A route inside a group or constructor route list failed validation.
    ///
    /// Carries the zero-based index of the failing route; none of the
    /// sibling routes were registered.
    Route {
        /// Index of the failing route within the group
        index: usize,
        /// Underlying validation failure
        source: Box<ValidationError>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoMethods => write!(f, "no HTTP methods supplied for route"),
            ValidationError::UnrecognizedMethod { method } => {
                write!(f, "'{}' is not a valid HTTP method", method)
            }
            ValidationError::Pattern { pattern, source } => {
                write!(f, "invalid route pattern '{}': {}", pattern, source)
            }
            ValidationError::Route { index, source } => {
                write!(f, "route {}: {}", index, source)
            }
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidationError::Pattern { source, .. } => Some(source),
            ValidationError::Route { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Error raised when a serialized dispatch table cannot be rehydrated.
///
/// The cache layer treats any of these as a cache miss; they never reach the
/// dispatch caller.
#[derive(Debug)]
pub enum BlobError {
    /// The bytes are not a valid encoding of a table blob.
    Decode(serde_json::Error),
    /// The blob was written by an incompatible format version.
    FormatVersion {
        /// Version found in the blob
        found: u32,
    },
    /// The blob names a method outside the recognized set.
    Method {
        /// The rejected method string
        method: String,
    },
    /// A stored chunk regex no longer compiles.
    Regex {
        /// Compile error reported by the regex engine
        message: String,
    },
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobError::Decode(err) => write!(f, "dispatch table blob failed to decode: {}", err),
            BlobError::FormatVersion { found } => {
                write!(f, "dispatch table blob has unsupported format version {}", found)
            }
            BlobError::Method { method } => {
                write!(f, "dispatch table blob names invalid method '{}'", method)
            }
            BlobError::Regex { message } => {
                write!(f, "dispatch table blob regex failed to compile: {}", message)
            }
        }
    }
}

impl std::error::Error for BlobError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BlobError {
    fn from(err: serde_json::Error) -> Self {
        BlobError::Decode(err)
    }
}
