//! Pre-tool-use hook: blocks tool calls that touch secret files
//!
//! Reads one tool-invocation JSON object from stdin and exits 0 (allow)
//! or 2 (block, with a single explanatory line on stderr). Any internal
//! failure blocks; this process must never allow by accident.

use std::process::ExitCode;

use secretguard_core::{AuditLog, FileStore, CONFIG_UNAVAILABLE};
use secretguard_hooks::{init_tracing, run_secret_guard, GuardOutcome, EXIT_BLOCK};

fn main() -> ExitCode {
    init_tracing();

    let outcome = match FileStore::from_env() {
        Ok(store) => {
            let audit = AuditLog::new(store.dir());
            run_secret_guard(&mut std::io::stdin().lock(), &store, Some(&audit))
        }
        // Cache directory could not even be created: fail closed
        Err(_) => GuardOutcome {
            exit_code: EXIT_BLOCK,
            stderr_line: Some(format!(
                "Secret file access blocked: {}",
                CONFIG_UNAVAILABLE
            )),
        },
    };

    if let Some(line) = &outcome.stderr_line {
        eprintln!("{}", line);
    }
    ExitCode::from(outcome.exit_code as u8)
}
