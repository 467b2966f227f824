//! Deny/allow pattern lists and the on-disk tier format

use serde::{Deserialize, Serialize};

/// Merged deny/allow pattern lists
///
/// Deny patterns name files that must never be touched; allow patterns are
/// explicit exceptions that win over a deny match. Both lists are ordered
/// and deduplicated by exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    /// Glob patterns for files that must not be accessed
    pub deny: Vec<String>,
    /// Glob patterns for exceptions that override a deny match
    pub allow: Vec<String>,
}

impl PatternSet {
    /// Create an empty pattern set
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb another tier, preserving first-seen order and deduplicating
    /// by exact string equality
    pub fn extend_dedup(&mut self, other: PatternSet) {
        for pattern in other.deny {
            if !self.deny.contains(&pattern) {
                self.deny.push(pattern);
            }
        }
        for pattern in other.allow {
            if !self.allow.contains(&pattern) {
                self.allow.push(pattern);
            }
        }
    }
}

/// One configuration tier as it appears on disk
///
/// A tier file is either a `{"deny": [...], "allow": [...]}` object or a
/// bare array of patterns. The bare form predates allow lists and is
/// treated as an all-deny list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TierConfig {
    /// Deny/allow object form
    Split {
        #[serde(default)]
        deny: Vec<String>,
        #[serde(default)]
        allow: Vec<String>,
    },
    /// Legacy bare-array form: every entry is a deny pattern
    Bare(Vec<String>),
}

impl TierConfig {
    /// Normalize the tier into a pattern set
    pub fn into_pattern_set(self) -> PatternSet {
        match self {
            TierConfig::Split { deny, allow } => PatternSet { deny, allow },
            TierConfig::Bare(deny) => PatternSet {
                deny,
                allow: Vec::new(),
            },
        }
    }
}
