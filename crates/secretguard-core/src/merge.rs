//! Denylist merge engine
//!
//! Layers three configuration tiers into the session cache:
//!
//! 1. Built-in defaults shipped with the plugin (required)
//! 2. Global user config at `~/.claude/security/denylist.json` (optional)
//! 3. Project config at `<project>/.claude/security/denylist.json` (optional)
//!
//! Deny and allow lists are unioned in tier order and deduplicated. The
//! result is persisted through the store's atomic writes, so a guard
//! running concurrently never reads a torn pattern file. Re-running with
//! unchanged inputs produces identical output.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::patterns::{PatternSet, TierConfig};
use crate::store::Store;

/// Built-in defaults file, relative to the plugin root
pub const DEFAULTS_FILE: &str = "config/default-denylist.json";

/// Optional per-user and per-project tier file, relative to the home
/// directory and the project directory respectively
pub const TIER_FILE: &str = ".claude/security/denylist.json";

/// Outcome of a merge run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Merged deny patterns written to the cache
    pub deny_count: usize,
    /// Merged allow patterns written to the cache
    pub allow_count: usize,
    /// Tiers that contributed (1 to 3)
    pub tiers_loaded: usize,
}

/// Merge all configuration tiers and persist the result
///
/// The built-in defaults under `plugin_root` must load; their absence is a
/// fatal configuration error. The global and project tiers are optional
/// and are skipped silently when absent or malformed.
pub fn merge_denylists(
    plugin_root: &Path,
    project_dir: &Path,
    store: &dyn Store,
) -> Result<MergeSummary> {
    merge_tiers(
        &plugin_root.join(DEFAULTS_FILE),
        global_tier_path().as_deref(),
        &project_dir.join(TIER_FILE),
        store,
    )
}

/// Merge with every tier path spelled out
///
/// `merge_denylists` resolves the conventional locations; this variant
/// exists so callers (and tests) can pin the tiers explicitly.
pub fn merge_tiers(
    defaults_path: &Path,
    global_path: Option<&Path>,
    project_path: &Path,
    store: &dyn Store,
) -> Result<MergeSummary> {
    let mut merged = load_required_tier(defaults_path)?;
    let mut tiers_loaded = 1;

    if let Some(tier) = global_path.and_then(load_optional_tier) {
        merged.extend_dedup(tier);
        tiers_loaded += 1;
    }

    if let Some(tier) = load_optional_tier(project_path) {
        merged.extend_dedup(tier);
        tiers_loaded += 1;
    }

    store.write_patterns(&merged)?;

    let summary = MergeSummary {
        deny_count: merged.deny.len(),
        allow_count: merged.allow.len(),
        tiers_loaded,
    };
    info!(
        deny = summary.deny_count,
        allow = summary.allow_count,
        tiers = summary.tiers_loaded,
        "merged denylist tiers"
    );
    Ok(summary)
}

fn global_tier_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(TIER_FILE))
}

fn load_required_tier(path: &Path) -> Result<PatternSet> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::DefaultsUnavailable(format!("{}: {}", path.display(), e)))?;
    let tier: TierConfig = serde_json::from_str(&content)
        .map_err(|e| Error::DefaultsUnavailable(format!("{}: {}", path.display(), e)))?;
    Ok(tier.into_pattern_set())
}

/// Load an optional tier; absence or garbage contributes nothing
fn load_optional_tier(path: &Path) -> Option<PatternSet> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping unreadable tier");
            return None;
        }
    };
    match serde_json::from_str::<TierConfig>(&content) {
        Ok(tier) => Some(tier.into_pattern_set()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping malformed tier");
            None
        }
    }
}
