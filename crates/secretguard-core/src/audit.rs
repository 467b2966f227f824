//! Best-effort audit trail of guard decisions
//!
//! Each decision is appended as one JSON line to a file in the cache
//! directory. Auditing never changes a decision: a failed write is logged
//! at debug level and dropped, because the guard's exit code is the only
//! contract the host relies on.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::guard::Decision;

/// Audit log file inside the cache directory
pub const AUDIT_FILE: &str = "guard-audit.jsonl";

/// One audited guard decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for this entry
    pub id: String,
    /// When the decision was made
    pub timestamp: DateTime<Utc>,
    /// Tool name as the host reported it
    pub tool: String,
    /// `allow` or `block`
    pub decision: String,
    /// Blocked file name, when blocked
    pub matched: Option<String>,
}

impl AuditEntry {
    /// Build an entry from a guard decision
    pub fn from_decision(tool: &str, decision: &Decision) -> Self {
        let (verdict, matched) = match decision {
            Decision::Allow => ("allow", None),
            Decision::Block { matched } => ("block", Some(matched.clone())),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            tool: tool.to_string(),
            decision: verdict.to_string(),
            matched,
        }
    }
}

/// Append-only audit log backed by a JSONL file
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Create a log over the given cache directory
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Self {
        Self {
            path: cache_dir.as_ref().join(AUDIT_FILE),
        }
    }

    /// Record an entry, swallowing any failure
    pub fn record(&self, entry: &AuditEntry) {
        if let Err(e) = self.append(entry) {
            debug!(error = %e, "audit write failed, ignoring");
        }
    }

    fn append(&self, entry: &AuditEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Read back every entry, skipping unparseable lines
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content
                .lines()
                .filter_map(|line| serde_json::from_str(line).ok())
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
