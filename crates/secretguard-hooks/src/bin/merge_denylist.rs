//! Session-start hook: merges denylist tiers into the session cache
//!
//! Exits 0 on success, 1 when the built-in defaults cannot be loaded.
//! Intended to run once per session before the secret guard starts
//! consulting the cache.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use secretguard_core::{merge_denylists, FileStore, MergeSummary};
use secretguard_hooks::{init_tracing, PLUGIN_ROOT_ENV};

#[derive(Parser)]
#[command(name = "merge-denylist")]
#[command(about = "Merge built-in, global and project denylists into the session cache")]
struct Cli {
    /// Project root holding the optional .claude/security/denylist.json
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Plugin installation root; defaults to $CLAUDE_PLUGIN_ROOT
    #[arg(long)]
    plugin_root: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<MergeSummary> {
    let plugin_root = cli
        .plugin_root
        .or_else(|| std::env::var(PLUGIN_ROOT_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let store = FileStore::from_env().context("cannot open session cache")?;
    let summary = merge_denylists(&plugin_root, &cli.project_dir, &store)?;
    Ok(summary)
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(summary) => {
            println!(
                "Merged {} deny and {} allow patterns from {} tier(s)",
                summary.deny_count, summary.allow_count, summary.tiers_loaded
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("merge-denylist: {:#}", e);
            ExitCode::from(1)
        }
    }
}
