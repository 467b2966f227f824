//! Session cache storage for merged patterns and exemptions
//!
//! The cache directory is the only shared mutable state in the subsystem.
//! The merge engine writes the pattern files, the exemption CLI appends to
//! the override list, and the guard reads both on every invocation. The
//! store is injected explicitly so tests can swap in an in-memory fake.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::patterns::PatternSet;

/// Environment variable overriding the cache directory location
pub const CACHE_DIR_ENV: &str = "SECRET_GUARD_CACHE_DIR";

/// Merged deny patterns, flat JSON array
pub const DENY_PATTERNS_FILE: &str = "deny-patterns.json";

/// Merged allow patterns, flat JSON array
pub const ALLOW_PATTERNS_FILE: &str = "allow-patterns.json";

/// Newline-delimited session exemption list
pub const EXEMPTIONS_FILE: &str = "secret-overrides";

/// Storage for merged patterns and session exemptions
pub trait Store: Send + Sync {
    /// Load the merged deny/allow pattern lists
    ///
    /// # Errors
    ///
    /// Returns an error when either pattern file is missing or corrupt.
    /// Callers on the guard path must treat that error as a block.
    fn load_patterns(&self) -> Result<PatternSet>;

    /// Persist the merged pattern lists, atomically per file
    fn write_patterns(&self, patterns: &PatternSet) -> Result<()>;

    /// Load the session exemption list (empty when none granted yet)
    fn load_exemptions(&self) -> Result<Vec<String>>;

    /// Record a session exemption
    ///
    /// Returns `false` when the entry was already present (dedup by exact
    /// string equality), `true` when newly added.
    fn append_exemption(&self, entry: &str) -> Result<bool>;
}

/// Resolve the session cache directory
///
/// Uses the `SECRET_GUARD_CACHE_DIR` override verbatim when set, otherwise
/// a per-user directory under the OS temp dir so concurrent users on a
/// shared host do not collide.
pub fn resolve_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "default".to_string());
    std::env::temp_dir().join(format!("secret-guard-{}", user))
}

/// File-backed store over the session cache directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store over a specific directory, creating it if absent
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open a store over the environment-resolved cache directory
    pub fn from_env() -> Result<Self> {
        Self::new(resolve_cache_dir())
    }

    /// The cache directory this store operates on
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn deny_path(&self) -> PathBuf {
        self.dir.join(DENY_PATTERNS_FILE)
    }

    fn allow_path(&self) -> PathBuf {
        self.dir.join(ALLOW_PATTERNS_FILE)
    }

    fn exemptions_path(&self) -> PathBuf {
        self.dir.join(EXEMPTIONS_FILE)
    }

    /// Write a JSON value to `path` via a temp file in the same directory
    /// plus rename, so a concurrent reader never observes a partial write
    fn write_json_atomic<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.write_all(b"\n")?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn read_pattern_file(&self, path: &Path) -> Result<Vec<String>> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::CacheUnavailable(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::CacheUnavailable(format!("{}: {}", path.display(), e)))
    }
}

impl Store for FileStore {
    fn load_patterns(&self) -> Result<PatternSet> {
        let deny = self.read_pattern_file(&self.deny_path())?;
        let allow = self.read_pattern_file(&self.allow_path())?;
        Ok(PatternSet { deny, allow })
    }

    fn write_patterns(&self, patterns: &PatternSet) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.write_json_atomic(&self.deny_path(), &patterns.deny)?;
        self.write_json_atomic(&self.allow_path(), &patterns.allow)?;
        Ok(())
    }

    fn load_exemptions(&self) -> Result<Vec<String>> {
        match fs::read_to_string(self.exemptions_path()) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::StoreError(format!(
                "{}: {}",
                self.exemptions_path().display(),
                e
            ))),
        }
    }

    fn append_exemption(&self, entry: &str) -> Result<bool> {
        fs::create_dir_all(&self.dir)?;
        let existing = self.load_exemptions()?;
        if existing.iter().any(|e| e == entry) {
            return Ok(false);
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.exemptions_path())?;
        writeln!(file, "{}", entry)?;
        Ok(true)
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryStore {
    patterns: RwLock<Option<PatternSet>>,
    exemptions: RwLock<Vec<String>>,
}

impl MemoryStore {
    /// Create an empty store with no pattern cache
    ///
    /// `load_patterns` on a fresh store fails the same way a missing cache
    /// directory does, which is what fail-closed tests want.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with merged patterns
    pub fn with_patterns(patterns: PatternSet) -> Self {
        Self {
            patterns: RwLock::new(Some(patterns)),
            exemptions: RwLock::new(Vec::new()),
        }
    }
}

impl Store for MemoryStore {
    fn load_patterns(&self) -> Result<PatternSet> {
        let patterns = self
            .patterns
            .read()
            .map_err(|e| Error::Internal(format!("Failed to read patterns: {}", e)))?;
        patterns
            .clone()
            .ok_or_else(|| Error::CacheUnavailable("no merged patterns".to_string()))
    }

    fn write_patterns(&self, patterns: &PatternSet) -> Result<()> {
        let mut stored = self
            .patterns
            .write()
            .map_err(|e| Error::Internal(format!("Failed to write patterns: {}", e)))?;
        *stored = Some(patterns.clone());
        Ok(())
    }

    fn load_exemptions(&self) -> Result<Vec<String>> {
        let exemptions = self
            .exemptions
            .read()
            .map_err(|e| Error::Internal(format!("Failed to read exemptions: {}", e)))?;
        Ok(exemptions.clone())
    }

    fn append_exemption(&self, entry: &str) -> Result<bool> {
        let mut exemptions = self
            .exemptions
            .write()
            .map_err(|e| Error::Internal(format!("Failed to write exemptions: {}", e)))?;
        if exemptions.iter().any(|e| e == entry) {
            return Ok(false);
        }
        exemptions.push(entry.to_string());
        Ok(true)
    }
}
