//! Hook entry points behind the secret guard binaries
//!
//! Each binary is a thin process wrapper around a `run_*` function here,
//! so the decision logic, output lines, and exit codes stay testable
//! without spawning processes. Exit codes follow the host's pre-tool-use
//! hook convention: 0 lets the call proceed, 2 blocks it and surfaces the
//! stderr line to the user.

use std::io::Read;

use tracing::warn;

use secretguard_core::{AuditEntry, AuditLog, Decision, SecretGuard, Store, ToolCall};

/// Exit code letting the host proceed with the tool call
pub const EXIT_ALLOW: i32 = 0;

/// Exit code blocking the tool call
pub const EXIT_BLOCK: i32 = 2;

/// Environment variable pointing at the installed plugin root
pub const PLUGIN_ROOT_ENV: &str = "CLAUDE_PLUGIN_ROOT";

/// Result of one guard invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    /// Process exit code (0 allow, 2 block)
    pub exit_code: i32,
    /// The single stderr line to emit, present only on block
    pub stderr_line: Option<String>,
}

impl GuardOutcome {
    fn allow() -> Self {
        Self {
            exit_code: EXIT_ALLOW,
            stderr_line: None,
        }
    }

    fn block(matched: &str) -> Self {
        Self {
            exit_code: EXIT_BLOCK,
            stderr_line: Some(format!("Secret file access blocked: {}", matched)),
        }
    }
}

/// Run the secret guard over one hook invocation read from `input`
///
/// Every failure mode resolves to a block: unreadable input, malformed
/// JSON, and any store error inside the guard. The audit log is
/// best-effort and never affects the outcome.
pub fn run_secret_guard(
    input: &mut dyn Read,
    store: &dyn Store,
    audit: Option<&AuditLog>,
) -> GuardOutcome {
    let mut raw = String::new();
    if let Err(e) = input.read_to_string(&mut raw) {
        warn!(error = %e, "could not read hook input, failing closed");
        return GuardOutcome::block("unreadable tool invocation");
    }

    let call = match ToolCall::parse(&raw) {
        Ok(call) => call,
        Err(e) => {
            warn!(error = %e, "could not parse hook input, failing closed");
            return GuardOutcome::block("unreadable tool invocation");
        }
    };

    let decision = SecretGuard::new(store).evaluate(&call);
    if let Some(log) = audit {
        log.record(&AuditEntry::from_decision(call.tool_name(), &decision));
    }

    match decision {
        Decision::Allow => GuardOutcome::allow(),
        Decision::Block { matched } => GuardOutcome::block(&matched),
    }
}

/// Result of one exemption CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExemptOutcome {
    /// Process exit code (0 success, 1 usage or store failure)
    pub exit_code: i32,
    /// Status lines for stdout, one per argument plus the disclaimer
    pub stdout_lines: Vec<String>,
    /// Usage or error line for stderr
    pub stderr_line: Option<String>,
}

/// Record session exemptions for each argument
pub fn run_exempt(patterns: &[String], store: &dyn Store) -> ExemptOutcome {
    if patterns.is_empty() {
        return ExemptOutcome {
            exit_code: 1,
            stdout_lines: Vec::new(),
            stderr_line: Some("Usage: exempt-secret <pattern> [<pattern> ...]".to_string()),
        };
    }

    let mut stdout_lines = Vec::new();
    for pattern in patterns {
        match store.append_exemption(pattern) {
            Ok(true) => stdout_lines.push(format!("Granted session access to: {}", pattern)),
            Ok(false) => stdout_lines.push(format!("Already exempted: {}", pattern)),
            Err(e) => {
                return ExemptOutcome {
                    exit_code: 1,
                    stdout_lines,
                    stderr_line: Some(format!("Failed to record exemption: {}", e)),
                }
            }
        }
    }
    stdout_lines
        .push("Exemptions are session-scoped and reset with the session cache.".to_string());

    ExemptOutcome {
        exit_code: 0,
        stdout_lines,
        stderr_line: None,
    }
}

/// Initialize tracing for a hook binary
///
/// Diagnostics are opt-in via `RUST_LOG`; with it unset nothing is
/// emitted, which keeps the guard's one-line stderr contract intact.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use secretguard_core::{MemoryStore, PatternSet};

    fn populated_store() -> MemoryStore {
        MemoryStore::with_patterns(PatternSet {
            deny: vec![".env".to_string(), "*.pem".to_string()],
            allow: vec![".env.example".to_string()],
        })
    }

    fn run_guard_on(json: &str, store: &dyn Store) -> GuardOutcome {
        let mut input = json.as_bytes();
        run_secret_guard(&mut input, store, None)
    }

    #[test]
    fn test_guard_blocks_denied_read() {
        let store = populated_store();
        let outcome = run_guard_on(
            r#"{"tool_name": "Read", "tool_input": {"file_path": "/p/.env"}}"#,
            &store,
        );
        assert_eq!(outcome.exit_code, EXIT_BLOCK);
        assert_eq!(
            outcome.stderr_line.as_deref(),
            Some("Secret file access blocked: .env")
        );
    }

    #[test]
    fn test_guard_allows_plain_read() {
        let store = populated_store();
        let outcome = run_guard_on(
            r#"{"tool_name": "Read", "tool_input": {"file_path": "/p/main.rs"}}"#,
            &store,
        );
        assert_eq!(outcome, GuardOutcome::allow());
    }

    #[test]
    fn test_guard_blocks_malformed_input() {
        let store = populated_store();
        let outcome = run_guard_on("{ not json", &store);
        assert_eq!(outcome.exit_code, EXIT_BLOCK);
        assert_eq!(
            outcome.stderr_line.as_deref(),
            Some("Secret file access blocked: unreadable tool invocation")
        );
    }

    #[test]
    fn test_guard_fails_closed_without_cache() {
        let store = MemoryStore::new();
        let outcome = run_guard_on(
            r#"{"tool_name": "Write", "tool_input": {"file_path": "/p/notes.md"}}"#,
            &store,
        );
        assert_eq!(outcome.exit_code, EXIT_BLOCK);
        assert_eq!(
            outcome.stderr_line.as_deref(),
            Some("Secret file access blocked: configuration unavailable")
        );
    }

    #[test]
    fn test_guard_passes_non_file_tools_through() {
        let store = MemoryStore::new();
        let outcome = run_guard_on(
            r#"{"tool_name": "WebFetch", "tool_input": {"url": "https://example.com"}}"#,
            &store,
        );
        assert_eq!(outcome, GuardOutcome::allow());
    }

    #[test]
    fn test_exempt_requires_arguments() {
        let store = populated_store();
        let outcome = run_exempt(&[], &store);
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.stderr_line.unwrap().starts_with("Usage:"));
        assert!(outcome.stdout_lines.is_empty());
    }

    #[test]
    fn test_exempt_grants_and_dedups() {
        let store = populated_store();

        let first = run_exempt(&[".env".to_string()], &store);
        assert_eq!(first.exit_code, 0);
        assert_eq!(first.stdout_lines[0], "Granted session access to: .env");
        assert!(first.stdout_lines.last().unwrap().contains("session-scoped"));

        let second = run_exempt(&[".env".to_string()], &store);
        assert_eq!(second.exit_code, 0);
        assert_eq!(second.stdout_lines[0], "Already exempted: .env");

        assert_eq!(store.load_exemptions().unwrap(), vec![".env"]);
    }

    #[test]
    fn test_exempt_then_guard_allows() {
        let store = populated_store();
        run_exempt(&[".env".to_string()], &store);

        let outcome = run_guard_on(
            r#"{"tool_name": "Read", "tool_input": {"file_path": "/project/.env"}}"#,
            &store,
        );
        assert_eq!(outcome, GuardOutcome::allow());
    }
}
