//! The secret guard decision procedure
//!
//! Two error policies meet here and must not be confused: optional config
//! tiers fail open (handled in the merge engine), but the guard's own
//! decision path fails closed. Any failure to load the merged cache or
//! the exemption list blocks every file-shaped call.

use tracing::{debug, warn};

use crate::glob_matcher::GlobMatcher;
use crate::patterns::PatternSet;
use crate::store::Store;
use crate::toolcall::{basename, ToolCall};

/// Name reported when the guard blocks because its own configuration
/// could not be loaded
pub const CONFIG_UNAVAILABLE: &str = "configuration unavailable";

/// Outcome of evaluating one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The call may proceed
    Allow,
    /// The call must be rejected; `matched` names the offending file
    Block { matched: String },
}

impl Decision {
    /// Exit code the host expects: 0 = proceed, 2 = deny
    pub fn exit_code(&self) -> i32 {
        match self {
            Decision::Allow => 0,
            Decision::Block { .. } => 2,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Block { matched } => write!(f, "block({})", matched),
        }
    }
}

/// Stateless evaluator over an injected store
///
/// The guard reloads patterns and exemptions on every call; it carries no
/// state between invocations beyond what the store holds.
pub struct SecretGuard<'a> {
    store: &'a dyn Store,
    matcher: GlobMatcher,
}

impl<'a> SecretGuard<'a> {
    /// Create a guard over a store
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            matcher: GlobMatcher::new(),
        }
    }

    /// Decide whether a tool call may proceed
    pub fn evaluate(&self, call: &ToolCall) -> Decision {
        // Tools the guard does not police pass before any config access
        if !call.is_file_shaped() {
            debug!(tool = call.tool_name(), "non-file tool, allowing");
            return Decision::Allow;
        }

        // The exemption CLI must stay reachable even though its arguments
        // name secret files
        if call.invokes_exemption_cli() {
            debug!("exemption CLI invocation, allowing without scan");
            return Decision::Allow;
        }

        let patterns = match self.store.load_patterns() {
            Ok(patterns) => patterns,
            Err(e) => {
                warn!(error = %e, "pattern cache unavailable, failing closed");
                return Decision::Block {
                    matched: CONFIG_UNAVAILABLE.to_string(),
                };
            }
        };
        let exemptions = match self.store.load_exemptions() {
            Ok(exemptions) => exemptions,
            Err(e) => {
                warn!(error = %e, "exemption list unreadable, failing closed");
                return Decision::Block {
                    matched: CONFIG_UNAVAILABLE.to_string(),
                };
            }
        };

        for candidate in call.candidate_paths(&patterns.deny) {
            if let Some(matched) = self.denied_name(&candidate, &patterns, &exemptions) {
                return Decision::Block { matched };
            }
        }
        Decision::Allow
    }

    /// Check one candidate; `Some(name)` means it hit a deny pattern with
    /// no exemption or allow-pattern override
    fn denied_name(
        &self,
        candidate: &str,
        patterns: &PatternSet,
        exemptions: &[String],
    ) -> Option<String> {
        let base = basename(candidate);

        // Session exemptions win over everything
        let exempted = exemptions.iter().any(|entry| {
            entry == candidate
                || entry == base
                || self.matcher.matches(entry, candidate)
                || self.matcher.matches(entry, base)
        });
        if exempted {
            debug!(candidate, "session exemption, allowing");
            return None;
        }

        // Allow patterns override a deny match
        let allowed = patterns
            .allow
            .iter()
            .any(|p| self.matcher.matches(p, base) || self.matcher.matches(p, candidate));
        if allowed {
            return None;
        }

        let denied = patterns
            .deny
            .iter()
            .any(|p| self.matcher.matches(p, base) || self.matcher.matches(p, candidate));
        if denied {
            let matched = if base.is_empty() { candidate } else { base };
            return Some(matched.to_string());
        }
        None
    }
}
