//! Secret-file access control for AI assistant tool calls
//!
//! Implements the decision core behind a set of pre-tool-use hooks: a
//! three-tier denylist merge engine, a session cache with user-granted
//! exemptions, and a fail-closed guard that inspects each file-shaped
//! tool invocation before the host executes it.

pub mod audit;
pub mod error;
pub mod glob_matcher;
pub mod guard;
pub mod merge;
pub mod patterns;
pub mod store;
pub mod toolcall;

pub use audit::{AuditEntry, AuditLog};
pub use error::{Error, Result};
pub use glob_matcher::GlobMatcher;
pub use guard::{Decision, SecretGuard, CONFIG_UNAVAILABLE};
pub use merge::{merge_denylists, merge_tiers, MergeSummary};
pub use patterns::{PatternSet, TierConfig};
pub use store::{resolve_cache_dir, FileStore, MemoryStore, Store};
pub use toolcall::{ToolCall, EXEMPTION_CLI};
