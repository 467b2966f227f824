//! Workspace-level tests running the full pipeline over the shipped
//! default denylist: merge into a session cache, guard tool calls against
//! it, grant exemptions.

use std::path::{Path, PathBuf};

use secretguard_core::{merge_tiers, Decision, FileStore, SecretGuard, Store, ToolCall};
use secretguard_hooks::{run_exempt, run_secret_guard, EXIT_ALLOW, EXIT_BLOCK};
use tempfile::TempDir;

fn shipped_defaults() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default-denylist.json")
}

fn merged_store(cache: &Path) -> FileStore {
    let store = FileStore::new(cache).unwrap();
    let no_project_tier = cache.join("no-such-file.json");
    merge_tiers(&shipped_defaults(), None, &no_project_tier, &store).unwrap();
    store
}

#[test]
fn test_shipped_defaults_cover_common_secrets() {
    let cache = TempDir::new().expect("Failed to create temp dir");
    let store = merged_store(cache.path());
    let guard = SecretGuard::new(&store);

    for secret in [
        "/project/.env",
        "/home/user/.ssh/id_rsa",
        "/home/user/.ssh/id_ed25519.pub",
        "/etc/ssl/private/server.pem",
        "/app/secrets.json",
        "/app/credentials.json",
        "/var/www/wp-config.php",
        "/home/user/.npmrc",
        "/home/user/.netrc",
        "/project/terraform.tfstate",
    ] {
        let call = ToolCall::Read {
            file_path: secret.to_string(),
        };
        assert!(
            matches!(guard.evaluate(&call), Decision::Block { .. }),
            "{} should be blocked by the shipped defaults",
            secret
        );
    }
}

#[test]
fn test_shipped_defaults_allow_templates() {
    let cache = TempDir::new().expect("Failed to create temp dir");
    let store = merged_store(cache.path());
    let guard = SecretGuard::new(&store);

    for benign in [
        "/project/.env.example",
        "/project/.env.dist",
        "/project/.env.template",
        "/project/src/main.rs",
        "/project/Cargo.toml",
        "/project/docs/environment.md",
    ] {
        let call = ToolCall::Read {
            file_path: benign.to_string(),
        };
        assert_eq!(
            guard.evaluate(&call),
            Decision::Allow,
            "{} should be allowed",
            benign
        );
    }
}

#[test]
fn test_merge_twice_produces_identical_cache_files() {
    let cache = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::new(cache.path()).unwrap();
    let no_project_tier = cache.path().join("no-such-file.json");

    merge_tiers(&shipped_defaults(), None, &no_project_tier, &store).unwrap();
    let deny_first = std::fs::read(cache.path().join("deny-patterns.json")).unwrap();
    let allow_first = std::fs::read(cache.path().join("allow-patterns.json")).unwrap();

    merge_tiers(&shipped_defaults(), None, &no_project_tier, &store).unwrap();
    let deny_second = std::fs::read(cache.path().join("deny-patterns.json")).unwrap();
    let allow_second = std::fs::read(cache.path().join("allow-patterns.json")).unwrap();

    assert_eq!(deny_first, deny_second);
    assert_eq!(allow_first, allow_second);
}

#[test]
fn test_project_tier_extends_shipped_defaults() {
    let cache = TempDir::new().expect("Failed to create temp dir");
    let project = TempDir::new().expect("Failed to create temp dir");
    let tier_path = project.path().join(".claude/security/denylist.json");
    std::fs::create_dir_all(tier_path.parent().unwrap()).unwrap();
    std::fs::write(&tier_path, r#"{"deny": ["internal-api.toml"], "allow": []}"#).unwrap();

    let store = FileStore::new(cache.path()).unwrap();
    let summary = merge_tiers(&shipped_defaults(), None, &tier_path, &store).unwrap();
    assert_eq!(summary.tiers_loaded, 2);

    let guard = SecretGuard::new(&store);
    let call = ToolCall::Read {
        file_path: "/project/internal-api.toml".to_string(),
    };
    assert!(matches!(guard.evaluate(&call), Decision::Block { .. }));

    // Defaults still apply alongside the project tier
    let call = ToolCall::Read {
        file_path: "/project/.env".to_string(),
    };
    assert!(matches!(guard.evaluate(&call), Decision::Block { .. }));
}

#[test]
fn test_hook_round_trip_with_exemption() {
    let cache = TempDir::new().expect("Failed to create temp dir");
    let store = merged_store(cache.path());

    let request =
        r#"{"tool_name": "Bash", "tool_input": {"command": "cat /deploy/secrets.json"}}"#;

    let mut input = request.as_bytes();
    let before = run_secret_guard(&mut input, &store, None);
    assert_eq!(before.exit_code, EXIT_BLOCK);

    let grant = run_exempt(&["secrets.json".to_string()], &store);
    assert_eq!(grant.exit_code, 0);

    let mut input = request.as_bytes();
    let after = run_secret_guard(&mut input, &store, None);
    assert_eq!(after.exit_code, EXIT_ALLOW);
}
