//! Glob pattern matching for denylist entries

/// Matcher for shell-style glob patterns used in deny/allow lists
///
/// Supports:
/// - `*` to match any run of characters, including none and including `/`
///   (patterns are matched against bare basenames or whole path strings,
///   so there is no path-separator restriction)
/// - `?` to match exactly one character
/// - Every other character matches itself literally, including regex
///   metacharacters such as `.`, `[`, `]`, `(`, `)`, `+`, `$`, `^`
///
/// Matching is anchored at both ends and case-sensitive. Any string is a
/// valid pattern; matching never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobMatcher;

impl GlobMatcher {
    /// Create a new glob matcher
    pub fn new() -> Self {
        Self
    }

    /// Match a candidate string against a glob pattern
    pub fn matches(&self, pattern: &str, candidate: &str) -> bool {
        Self::match_recursive(pattern.as_bytes(), candidate.as_bytes())
    }

    /// Match a candidate against every pattern in a list
    pub fn matches_any<S: AsRef<str>>(&self, patterns: &[S], candidate: &str) -> Option<usize> {
        patterns
            .iter()
            .position(|p| self.matches(p.as_ref(), candidate))
    }

    fn match_recursive(pattern: &[u8], candidate: &[u8]) -> bool {
        match (pattern.first(), candidate.first()) {
            // Both exhausted - match
            (None, None) => true,
            // Pattern exhausted but candidate not - no match
            (None, Some(_)) => false,
            // Candidate exhausted - trailing stars can still match empty
            (Some(&b'*'), None) => Self::match_recursive(&pattern[1..], candidate),
            (Some(_), None) => false,
            // Star consumes zero characters or one and stays
            (Some(&b'*'), Some(_)) => {
                Self::match_recursive(&pattern[1..], candidate)
                    || Self::match_recursive(pattern, &candidate[1..])
            }
            // Question mark consumes exactly one character
            (Some(&b'?'), Some(_)) => Self::match_recursive(&pattern[1..], &candidate[1..]),
            // Literal character must match
            (Some(&p), Some(&c)) if p == c => {
                Self::match_recursive(&pattern[1..], &candidate[1..])
            }
            _ => false,
        }
    }
}
