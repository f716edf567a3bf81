//! Wildcard scanning and compilation.
//!
//! Queries embed wildcards as runs of `$`:
//!
//! - `$$` matches one identifier, or zero or more characters inside a string;
//! - `$$$` matches any node subtree, or one or more characters inside a
//!   string;
//! - `0x0` as a whole numeric literal matches any number.
//!
//! A wildcard may carry an alias, `$$_name` or `$$_name_`, binding the
//! captured value so that every other use of the alias must agree with it.

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;
use regex::Regex;
use thiserror::Error;

/// Marker of a single wildcard character.
pub const WILDCARD_CHAR: char = '$';

/// Identifier wildcard, or optional string wildcard.
pub const IDENTIFIER_WILDCARD: &str = "$$";

/// Node-subtree wildcard, or required string wildcard.
pub const NODES_TREE_WILDCARD: &str = "$$$";

/// Numeric literal matching every number.
pub const NUMERIC_WILDCARD: &str = "0x0";

/// Sequence rejected at query compile time.
pub const DISALLOWED_WILDCARD_SEQUENCE: &str = "$$$$";

/// Errors raised while compiling a wildcard pattern.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WildcardError {
    /// The pattern contains four or more consecutive wildcard characters.
    #[error("more than three wildcard chars are not allowed: '{pattern}'")]
    Disallowed {
        /// The rejected pattern.
        pattern: String,
    },
    /// The generated expression failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// What a wildcard stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardKind {
    /// `$$` inside an identifier.
    Identifier,
    /// `$$$` inside an identifier.
    NodesTree,
    /// `$$` or `$$$` inside string content.
    String,
}

/// One wildcard found in a name or string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardMeta {
    /// Kind of the wildcard.
    pub kind: WildcardKind,
    /// Wildcard text including its alias suffix, such as `$$_ref_`.
    pub with_alias: String,
    /// Alias name, if the wildcard carries a valid one.
    pub alias: Option<String>,
    /// Whether at least one character must be captured.
    pub required: bool,
}

impl WildcardMeta {
    /// Returns the bare wildcard, `$$` or `$$$`.
    #[must_use]
    pub const fn without_alias(&self) -> &'static str {
        if self.required {
            NODES_TREE_WILDCARD
        } else {
            IDENTIFIER_WILDCARD
        }
    }
}

#[derive(Debug)]
enum Segment<'s> {
    Literal(&'s str),
    Wildcard { required: bool, alias: Option<&'s str>, raw: &'s str },
}

#[derive(Debug)]
struct Scan<'s> {
    segments: Vec<Segment<'s>>,
    disallowed: bool,
}

fn scan(text: &str) -> Scan<'_> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut disallowed = false;
    let mut literal_start = 0;
    let mut index = 0;

    while let Some(&byte) = bytes.get(index) {
        if byte != b'$' {
            index += 1;
            continue;
        }
        let run_end = bytes
            .get(index..)
            .and_then(|rest| rest.iter().position(|&b| b != b'$'))
            .map_or(bytes.len(), |offset| index + offset);
        let run = run_end - index;
        if run < 2 {
            index = run_end;
            continue;
        }
        if run >= 4 {
            // `$$$${` is a wildcard followed by a template placeholder.
            disallowed |= run > 4 || bytes.get(run_end) != Some(&b'{');
        }

        let wildcard_end = index + run.min(3);
        let (alias, end) = read_alias(bytes, index, wildcard_end);
        if let Some(literal) = text.get(literal_start..index) {
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal));
            }
        }
        segments.push(Segment::Wildcard {
            required: run >= 3,
            alias: alias.and_then(|(start, stop)| text.get(start..stop)),
            raw: text.get(index..end).unwrap_or_default(),
        });
        literal_start = end;
        index = end;
    }

    if let Some(rest) = text.get(literal_start..) {
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
    }
    Scan {
        segments,
        disallowed,
    }
}

/// Reads `_name` or `_name_` after a wildcard ending at `wildcard_end`.
///
/// Returns the alias byte range and the end of the consumed text.
fn read_alias(
    bytes: &[u8],
    wildcard_start: usize,
    wildcard_end: usize,
) -> (Option<(usize, usize)>, usize) {
    let no_alias = (None, wildcard_end);
    if bytes.get(wildcard_end) != Some(&b'_') {
        return no_alias;
    }
    let preceded_by_underscore = wildcard_start
        .checked_sub(1)
        .and_then(|before| bytes.get(before))
        == Some(&b'_');
    if preceded_by_underscore {
        return no_alias;
    }

    let name_start = wildcard_end + 1;
    let name_end = bytes
        .get(name_start..)
        .and_then(|rest| rest.iter().position(|b| !b.is_ascii_alphanumeric()))
        .map_or(bytes.len(), |offset| name_start + offset);
    if name_end == name_start {
        return no_alias;
    }
    let end = if bytes.get(name_end) == Some(&b'_') {
        name_end + 1
    } else {
        name_end
    };
    if bytes.get(end) == Some(&b'$') {
        return no_alias;
    }
    (Some((name_start, name_end)), end)
}

fn collect_metas(text: &str, kind_for: impl Fn(bool) -> WildcardKind) -> Vec<WildcardMeta> {
    scan(text)
        .segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Literal(_) => None,
            Segment::Wildcard {
                required,
                alias,
                raw,
            } => Some(WildcardMeta {
                kind: kind_for(required),
                with_alias: raw.to_owned(),
                alias: alias.map(str::to_owned),
                required,
            }),
        })
        .collect()
}

/// Returns whether `text` contains an identifier or string wildcard.
#[must_use]
pub fn has_wildcard(text: &str) -> bool {
    text.contains(IDENTIFIER_WILDCARD)
}

/// Lists the wildcards of an identifier name in order of appearance.
#[must_use]
pub fn identifier_wildcards(name: &str) -> Vec<WildcardMeta> {
    collect_metas(name, |required| {
        if required {
            WildcardKind::NodesTree
        } else {
            WildcardKind::Identifier
        }
    })
}

/// Lists the wildcards of string content in order of appearance.
#[must_use]
pub fn string_wildcards(text: &str) -> Vec<WildcardMeta> {
    collect_metas(text, |_| WildcardKind::String)
}

/// Removes alias suffixes, leaving bare wildcards.
///
/// ```
/// assert_eq!(sift::wildcard::strip_aliases("pre$$_a_post$$$_b"), "pre$$post$$$");
/// ```
#[must_use]
pub fn strip_aliases(text: &str) -> String {
    scan(text)
        .segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(literal) => *literal,
            Segment::Wildcard {
                required, alias, raw, ..
            } => {
                if alias.is_none() {
                    raw
                } else if *required {
                    NODES_TREE_WILDCARD
                } else {
                    IDENTIFIER_WILDCARD
                }
            }
        })
        .collect()
}

/// Splits `text` into the literal fragments between its wildcards.
///
/// Invalid alias suffixes stay attached to the wildcard and are dropped.
#[must_use]
pub fn literal_fragments(text: &str) -> Vec<&str> {
    scan(text)
        .segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Literal(literal) => Some(literal),
            Segment::Wildcard { .. } => None,
        })
        .collect()
}

/// Compiles a wildcard pattern into an anchored regular expression.
///
/// Literal text is matched verbatim, `$$` becomes a lazy group that may be
/// empty and `$$$` a lazy group that must capture at least one character.
/// Each wildcard gets one positional capture group, in order.
///
/// # Errors
///
/// Returns [`WildcardError::Disallowed`] when the pattern contains four or
/// more consecutive `$`, or [`WildcardError::Regex`] if the generated
/// expression is rejected.
pub fn pattern_to_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, WildcardError> {
    let scanned = scan(pattern);
    if scanned.disallowed {
        return Err(WildcardError::Disallowed {
            pattern: pattern.to_owned(),
        });
    }

    let mut source = String::from(if case_insensitive { "(?si)^(?:" } else { "(?s)^(?:" });
    for segment in &scanned.segments {
        match segment {
            Segment::Literal(literal) => source.push_str(&regex::escape(literal)),
            Segment::Wildcard { required: true, .. } => source.push_str("(.+?)"),
            Segment::Wildcard { required: false, .. } => source.push_str("(.*?)"),
        }
    }
    source.push_str(")$");
    Ok(Regex::new(&source)?)
}

/// Default number of compiled patterns kept per search.
pub const DEFAULT_PATTERN_CACHE_CAPACITY: usize = 512;

/// Per-search cache of compiled wildcard patterns.
///
/// Keyed by pattern and case sensitivity. The cache is confined to the
/// thread running the search.
#[derive(Debug)]
pub struct PatternCache {
    compiled: RefCell<LruCache<(String, bool), Regex>>,
}

impl PatternCache {
    /// Creates a cache holding at most `capacity` patterns.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            compiled: RefCell::new(LruCache::new(capacity)),
        }
    }

    /// Returns the compiled pattern, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Propagates [`pattern_to_regex`] failures; failures are not cached.
    pub fn get(&self, pattern: &str, case_insensitive: bool) -> Result<Regex, WildcardError> {
        let key = (pattern.to_owned(), case_insensitive);
        if let Some(regex) = self.compiled.borrow_mut().get(&key) {
            return Ok(regex.clone());
        }
        let regex = pattern_to_regex(pattern, case_insensitive)?;
        self.compiled.borrow_mut().put(key, regex.clone());
        Ok(regex)
    }

    /// Returns the number of cached patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.borrow().len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.borrow().is_empty()
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CACHE_CAPACITY)
    }
}
