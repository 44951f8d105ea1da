//! Shell-style wildcard matching for pattern selection.
//!
//! `*` matches any run of characters, `?` a single character. Every other
//! character, brackets and braces included, stands for itself. Matching is
//! case-insensitive and anchored to the whole name.

use globset::{GlobBuilder, GlobMatcher};

/// Compiled wildcard pattern
///
/// An empty pattern compiles to a matcher that matches nothing.
#[derive(Debug, Clone)]
pub struct WildcardMatcher {
    pattern: String,
    matcher: Option<GlobMatcher>,
}

impl WildcardMatcher {
    pub fn new(pattern: &str) -> Self {
        let matcher = if pattern.is_empty() {
            None
        } else {
            match GlobBuilder::new(&to_glob(pattern))
                .case_insensitive(true)
                .literal_separator(false)
                .backslash_escape(false)
                .build()
            {
                Ok(glob) => Some(glob.compile_matcher()),
                Err(e) => {
                    tracing::debug!("Ignoring invalid selection pattern '{}': {}", pattern, e);
                    None
                }
            }
        };

        Self {
            pattern: pattern.to_string(),
            matcher,
        }
    }

    pub fn is_match(&self, name: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(name),
            None => false,
        }
    }

    /// Whether the pattern compiled into something that can match
    pub fn is_valid(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Glob source for a wildcard pattern
///
/// Glob metacharacters other than `*` and `?` are wrapped in a one-character
/// class so they match themselves. Runs of stars fold into one.
fn to_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    let mut last_was_star = false;

    for ch in pattern.chars() {
        match ch {
            '*' if last_was_star => continue,
            '*' | '?' => glob.push(ch),
            '[' | ']' | '{' | '}' => {
                glob.push('[');
                glob.push(ch);
                glob.push(']');
            }
            _ => glob.push(ch),
        }
        last_was_star = ch == '*';
    }

    glob
}
