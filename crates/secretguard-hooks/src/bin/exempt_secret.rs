//! Exemption CLI: grants session-scoped access to named secret files
//!
//! `exempt-secret <pattern> [<pattern> ...]` appends each pattern to the
//! session override list the guard consults. Exits 0 on success (also
//! when every pattern was already exempted), 1 with a usage message when
//! called without arguments.

use std::process::ExitCode;

use clap::Parser;

use secretguard_core::FileStore;
use secretguard_hooks::{init_tracing, run_exempt};

#[derive(Parser)]
#[command(name = "exempt-secret")]
#[command(about = "Grant session-scoped access to secret files the guard would block")]
struct Cli {
    /// Basenames or paths to exempt for this session
    patterns: Vec<String>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let store = match FileStore::from_env() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("exempt-secret: cannot open session cache: {}", e);
            return ExitCode::from(1);
        }
    };

    let outcome = run_exempt(&cli.patterns, &store);
    for line in &outcome.stdout_lines {
        println!("{}", line);
    }
    if let Some(line) = &outcome.stderr_line {
        eprintln!("{}", line);
    }
    ExitCode::from(outcome.exit_code as u8)
}
