use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Regex used for a placeholder when none is given: match anything up to the
/// next path separator.
pub const DEFAULT_PLACEHOLDER_REGEX: &str = "[^/]+";

/// Error raised when a route pattern fails to parse.
///
/// Pattern errors surface at registration time (`add`/`add_group`), never at
/// dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A placeholder regex contains a capturing group.
    ///
    /// Placeholder values are tracked by capture-group index, so user regexes
    /// must only use non-capturing `(?:...)` groups.
    CapturingGroup {
        /// Name of the offending placeholder
        name: String,
    },
    /// A required segment follows an optional one.
    OptionalNotAtEnd,
    /// The number of opening `[` and closing `]` brackets differs.
    UnbalancedBrackets,
    /// An optional part contains no text (`/foo[]`).
    EmptyOptionalPart,
    /// A `{` placeholder is missing its closing `}`.
    UnclosedPlaceholder,
    /// A placeholder has an empty name (`{}` or `{:regex}`).
    EmptyPlaceholderName,
    /// A placeholder name contains characters outside `[a-zA-Z0-9_]` or
    /// starts with a digit.
    InvalidPlaceholderName {
        /// The rejected name
        name: String,
    },
    /// A placeholder regex does not compile.
    InvalidRegex {
        /// Name of the offending placeholder
        name: String,
        /// Compile error reported by the regex engine
        message: String,
    },
    /// The same placeholder name is used twice in one pattern.
    DuplicatePlaceholder {
        /// The repeated name
        name: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::CapturingGroup { name } => write!(
                f,
                "regex for placeholder '{}' contains a capturing group; use '(?:...)' instead",
                name
            ),
            PatternError::OptionalNotAtEnd => {
                write!(f, "optional segments can only occur at the end of a route")
            }
            PatternError::UnbalancedBrackets => {
                write!(f, "number of opening '[' and closing ']' does not match")
            }
            PatternError::EmptyOptionalPart => write!(f, "empty optional part"),
            PatternError::UnclosedPlaceholder => {
                write!(f, "placeholder is missing a closing '}}'")
            }
            PatternError::EmptyPlaceholderName => write!(f, "placeholder has an empty name"),
            PatternError::InvalidPlaceholderName { name } => {
                write!(f, "'{}' is not a valid placeholder name", name)
            }
            PatternError::InvalidRegex { name, message } => write!(
                f,
                "regex for placeholder '{}' failed to compile: {}",
                name, message
            ),
            PatternError::DuplicatePlaceholder { name } => {
                write!(f, "cannot use placeholder '{}' twice", name)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// One piece of a pattern variant: literal text or a named placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Verbatim text, may span multiple path segments
    Literal(String),
    /// Named capture with its (non-capturing) regex
    Placeholder {
        /// Placeholder name, shared with extracted attributes
        name: Arc<str>,
        /// Regex source the placeholder value must match
        regex: String,
    },
}

/// One desugared alternative of a route pattern.
///
/// A pattern without optional parts has exactly one variant. Each optional
/// suffix adds a further variant that includes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternVariant {
    segments: Vec<Segment>,
}

impl PatternVariant {
    /// The ordered segments of this variant.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `true` when the variant contains no placeholders and can be matched by
    /// direct literal lookup.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// The literal path of a static variant, `None` when the variant has
    /// placeholders.
    #[must_use]
    pub fn literal_path(&self) -> Option<String> {
        if !self.is_static() {
            return None;
        }
        let mut path = String::new();
        for segment in &self.segments {
            if let Segment::Literal(text) = segment {
                path.push_str(text);
            }
        }
        Some(path)
    }

    /// Placeholder names in declaration order.
    #[must_use]
    pub fn placeholder_names(&self) -> Vec<Arc<str>> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder { name, .. } => Some(Arc::clone(name)),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Regex body for this variant: escaped literals with one capturing group
    /// per placeholder. Unanchored; the table builder adds anchors when it
    /// combines variants into chunks.
    #[must_use]
    pub fn regex_body(&self) -> String {
        let mut body = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => body.push_str(&regex::escape(text)),
                Segment::Placeholder { regex, .. } => {
                    body.push('(');
                    body.push_str(regex);
                    body.push(')');
                }
            }
        }
        body
    }
}

/// A parsed route pattern: the normalized source plus its desugared variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    variants: Vec<PatternVariant>,
}

impl RoutePattern {
    /// Parse a pattern string into its desugared variants.
    ///
    /// The pattern is normalized first (see [`crate::pattern`] module docs),
    /// then optional `[...]` suffixes are expanded: each nesting depth yields
    /// one variant omitting a deeper suffix, all sharing the same handler and
    /// method set downstream.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for capturing groups in placeholder
    /// regexes, misplaced or unbalanced optional brackets, malformed or
    /// duplicated placeholders, and placeholder regexes that do not compile.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let source = normalize_pattern(raw);
        let without_closing = source.trim_end_matches(']');
        let num_optionals = source.len() - without_closing.len();
        let parts = split_optional_parts(without_closing);
        if parts.len() - 1 != num_optionals {
            return Err(if without_closing.contains(']') {
                PatternError::OptionalNotAtEnd
            } else {
                PatternError::UnbalancedBrackets
            });
        }

        let mut variants = Vec::with_capacity(parts.len());
        let mut current = String::new();
        for (depth, part) in parts.iter().enumerate() {
            if part.is_empty() && depth != 0 {
                return Err(PatternError::EmptyOptionalPart);
            }
            current.push_str(part);
            variants.push(PatternVariant {
                segments: parse_segments(&current)?,
            });
        }

        // The deepest variant carries every placeholder of the pattern.
        if let Some(deepest) = variants.last() {
            let names = deepest.placeholder_names();
            for (i, name) in names.iter().enumerate() {
                if names[..i].contains(name) {
                    return Err(PatternError::DuplicatePlaceholder {
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(RoutePattern { source, variants })
    }

    /// The normalized pattern source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Desugared variants, shortest first.
    #[must_use]
    pub fn variants(&self) -> &[PatternVariant] {
        &self.variants
    }
}

/// Strip surrounding whitespace and slashes, then re-add a single leading
/// slash: `/foo/`, `foo` and `/foo` all normalize to `/foo`.
pub(crate) fn normalize_pattern(raw: &str) -> String {
    format!("/{}", raw.trim_matches(|c| c == ' ' || c == '/'))
}

/// Split a pattern on top-level `[`, leaving `[` inside placeholder braces
/// (regex character classes) alone.
fn split_optional_parts(route: &str) -> Vec<&str> {
    let bytes = route.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'[' if depth == 0 => {
                parts.push(&route[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&route[start..]);
    parts
}

/// Scan one variant's text into literal and placeholder segments.
fn parse_segments(route: &str) -> Result<Vec<Segment>, PatternError> {
    let bytes = route.as_bytes();
    let mut segments = Vec::new();
    let mut lit_start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        if lit_start < i {
            segments.push(Segment::Literal(route[lit_start..i].to_string()));
        }
        let name_start = i + 1;
        let mut j = name_start;
        while j < bytes.len() && bytes[j] != b':' && bytes[j] != b'}' {
            j += 1;
        }
        if j == bytes.len() {
            return Err(PatternError::UnclosedPlaceholder);
        }
        let name = route[name_start..j].trim();
        if name.is_empty() {
            return Err(PatternError::EmptyPlaceholderName);
        }
        if !is_valid_name(name) {
            return Err(PatternError::InvalidPlaceholderName {
                name: name.to_string(),
            });
        }
        let regex = if bytes[j] == b':' {
            // The regex may itself contain balanced braces (`\d{4}`), so scan
            // to the matching close with depth counting.
            let regex_start = j + 1;
            let mut depth = 1usize;
            let mut k = regex_start;
            while k < bytes.len() {
                match bytes[k] {
                    b'{' => depth += 1,
                    b'}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                k += 1;
            }
            if k == bytes.len() {
                return Err(PatternError::UnclosedPlaceholder);
            }
            i = k + 1;
            route[regex_start..k].trim().to_string()
        } else {
            i = j + 1;
            DEFAULT_PLACEHOLDER_REGEX.to_string()
        };
        validate_placeholder_regex(name, &regex)?;
        segments.push(Segment::Placeholder {
            name: Arc::from(name),
            regex,
        });
        lit_start = i;
    }
    if lit_start < bytes.len() {
        segments.push(Segment::Literal(route[lit_start..].to_string()));
    }
    Ok(segments)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_placeholder_regex(name: &str, regex: &str) -> Result<(), PatternError> {
    if count_capturing_groups(regex) > 0 {
        return Err(PatternError::CapturingGroup {
            name: name.to_string(),
        });
    }
    // Compile-check now so a bad user regex fails the registration call
    // instead of the dispatch table build.
    if let Err(err) = Regex::new(&format!("^(?:{regex})$")) {
        return Err(PatternError::InvalidRegex {
            name: name.to_string(),
            message: err.to_string(),
        });
    }
    Ok(())
}

/// Count capturing groups in a regex source: `(` not escaped, not inside a
/// character class, and not opening a `(?...)` construct other than the named
/// `(?P<...>` / `(?<...>` forms.
fn count_capturing_groups(regex: &str) -> usize {
    let bytes = regex.as_bytes();
    let mut count = 0usize;
    let mut in_class = false;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' if !in_class => in_class = true,
            b']' if in_class => in_class = false,
            b'(' if !in_class => {
                let rest = &bytes[i + 1..];
                let capturing = match rest.first() {
                    Some(b'?') => match rest.get(1) {
                        Some(b'P') => matches!(rest.get(2), Some(b'<')),
                        Some(b'<') => !matches!(rest.get(2), Some(b'=') | Some(b'!')),
                        _ => false,
                    },
                    _ => true,
                };
                if capturing {
                    count += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    count
}
