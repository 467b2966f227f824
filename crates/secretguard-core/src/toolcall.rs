//! Tool invocation records received from the host
//!
//! The host delivers one JSON object per pre-tool-use hook call:
//! `{ "tool_name": "...", "tool_input": { ... } }`. The input shape varies
//! by tool, so it is parsed once into a tagged union here and everything
//! downstream is exhaustive matching. Tools the guard does not know about
//! land in the explicit `Other` arm, which always passes.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::glob_matcher::GlobMatcher;

/// Binary name of the exemption CLI
///
/// A Bash command invoking it is allowed without path scanning, so a user
/// can grant an exemption even though the CLI's own arguments name secret
/// files.
pub const EXEMPTION_CLI: &str = "exempt-secret";

#[derive(Debug, Deserialize)]
struct RawInvocation {
    tool_name: String,
    #[serde(default)]
    tool_input: serde_json::Value,
}

/// One tool call, normalized from the host's hook JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Read { file_path: String },
    Write { file_path: String },
    Edit { file_path: String },
    Grep { path: Option<String> },
    Glob { path: Option<String> },
    Bash { command: String },
    /// Any tool the guard does not police
    Other { tool_name: String },
}

impl ToolCall {
    /// Parse a tool invocation from the host's JSON
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or on a known tool whose required field is
    /// missing. Guard callers must treat either as a block.
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawInvocation = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInvocation(format!("unparseable hook input: {}", e)))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawInvocation) -> Result<Self> {
        let input = &raw.tool_input;
        match raw.tool_name.as_str() {
            "Read" => Ok(ToolCall::Read {
                file_path: required_str(input, "file_path", &raw.tool_name)?,
            }),
            "Write" => Ok(ToolCall::Write {
                file_path: required_str(input, "file_path", &raw.tool_name)?,
            }),
            "Edit" => Ok(ToolCall::Edit {
                file_path: required_str(input, "file_path", &raw.tool_name)?,
            }),
            "Grep" => Ok(ToolCall::Grep {
                path: optional_str(input, "path"),
            }),
            "Glob" => Ok(ToolCall::Glob {
                path: optional_str(input, "path"),
            }),
            "Bash" => Ok(ToolCall::Bash {
                command: required_str(input, "command", &raw.tool_name)?,
            }),
            _ => Ok(ToolCall::Other {
                tool_name: raw.tool_name,
            }),
        }
    }

    /// Name of the tool as the host reported it
    pub fn tool_name(&self) -> &str {
        match self {
            ToolCall::Read { .. } => "Read",
            ToolCall::Write { .. } => "Write",
            ToolCall::Edit { .. } => "Edit",
            ToolCall::Grep { .. } => "Grep",
            ToolCall::Glob { .. } => "Glob",
            ToolCall::Bash { .. } => "Bash",
            ToolCall::Other { tool_name } => tool_name,
        }
    }

    /// Whether this call can touch the filesystem and is subject to the
    /// guard (and to fail-closed blocking when config is unavailable)
    pub fn is_file_shaped(&self) -> bool {
        !matches!(self, ToolCall::Other { .. })
    }

    /// Whether this is a Bash call invoking the exemption CLI
    pub fn invokes_exemption_cli(&self) -> bool {
        match self {
            ToolCall::Bash { command } => {
                let program = command
                    .split_whitespace()
                    .next()
                    .map(|t| t.trim_matches(|c| c == '"' || c == '\''))
                    .unwrap_or("");
                program == EXEMPTION_CLI
                    || program.ends_with(&format!("/{}", EXEMPTION_CLI))
            }
            _ => false,
        }
    }

    /// Every path-like string this call could touch
    ///
    /// Field-bearing tools contribute their field verbatim. Bash commands
    /// are scanned token-by-token: a token counts as a candidate when it
    /// contains a `/` or when a deny pattern matches it directly, so both
    /// `cat /project/.env` and `source .env` are caught. This is a
    /// best-effort heuristic over whitespace-split tokens, not a shell
    /// parser.
    pub fn candidate_paths(&self, deny_patterns: &[String]) -> Vec<String> {
        match self {
            ToolCall::Read { file_path }
            | ToolCall::Write { file_path }
            | ToolCall::Edit { file_path } => vec![file_path.clone()],
            ToolCall::Grep { path } | ToolCall::Glob { path } => {
                path.clone().into_iter().collect()
            }
            ToolCall::Bash { command } => extract_command_candidates(command, deny_patterns),
            ToolCall::Other { .. } => Vec::new(),
        }
    }
}

/// Final path component of a path-like string
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn required_str(input: &serde_json::Value, field: &str, tool: &str) -> Result<String> {
    optional_str(input, field).ok_or_else(|| {
        Error::InvalidInvocation(format!("{} call without string `{}`", tool, field))
    })
}

fn optional_str(input: &serde_json::Value, field: &str) -> Option<String> {
    input.get(field).and_then(|v| v.as_str()).map(String::from)
}

fn extract_command_candidates(command: &str, deny_patterns: &[String]) -> Vec<String> {
    let matcher = GlobMatcher::new();
    let mut candidates: Vec<String> = Vec::new();

    for raw in command.split_whitespace() {
        let token = raw.trim_matches(|c: char| {
            matches!(c, '"' | '\'' | '`' | ';' | '|' | '&' | '(' | ')' | '<' | '>' | ',')
        });
        if token.is_empty() || token.starts_with('-') {
            continue;
        }

        let looks_like_path = token.contains('/');
        let matches_deny = deny_patterns.iter().any(|p| {
            matcher.matches(p, token) || matcher.matches(p, basename(token))
        });
        if (looks_like_path || matches_deny) && !candidates.iter().any(|c| c == token) {
            candidates.push(token.to_string());
        }
    }

    candidates
}
