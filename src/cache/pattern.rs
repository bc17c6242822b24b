//! Key Pattern Module
//!
//! Redis `KEYS`-style glob matching on top of the `glob` crate.

use glob::{MatchOptions, Pattern, PatternError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

// == Key Pattern ==
/// Compiled glob over cache keys.
///
/// Supports `*`, `?`, `[abc]`, `[a-z]`, `[^a]` and backslash escapes.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    inner: Pattern,
}

impl KeyPattern {
    /// Compiles a Redis-style pattern.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            inner: Pattern::new(&translate(pattern))?,
        })
    }

    /// Whether `key` matches the whole pattern.
    pub fn matches(&self, key: &str) -> bool {
        self.inner.matches_with(key, MATCH_OPTIONS)
    }
}

/// Rewrites Redis glob syntax into the `glob` crate's dialect.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' if !in_class => match chars.next() {
                Some(escaped) => {
                    out.push('[');
                    out.push(escaped);
                    out.push(']');
                }
                None => out.push_str("[\\]"),
            },
            '[' if !in_class => {
                in_class = true;
                out.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    out.push('!');
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            // `glob` reads `**` as a recursive wildcard; in Redis it is just `*`
            '*' if !in_class => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                out.push('*');
            }
            other => out.push(other),
        }
    }
    out
}

/// Escapes glob metacharacters so `literal` matches only itself.
pub fn escape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
