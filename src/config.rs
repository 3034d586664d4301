use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MemdexConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub chunking: ChunkingConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// One database file per agent.
    pub db_path: String,
    /// Directory of markdown memory files indexed by `memdex index`.
    pub memory_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

/// Chunk window sizes, in characters.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Content up to this many characters becomes a single chunk.
    pub max_chars: usize,
    /// Characters shared by consecutive chunks.
    pub overlap_chars: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Result count used when a lexical search is given no explicit limit.
    pub default_limit: usize,
    /// Reciprocal Rank Fusion constant.
    pub rrf_k: usize,
    /// Each hybrid branch fetches `limit * candidate_multiplier` candidates.
    pub candidate_multiplier: usize,
}

/// The subset of configuration the engine itself needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSettings {
    pub chunking: ChunkingConfig,
    pub search: SearchConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = default_memdex_dir();
        Self {
            db_path: dir.join("memory.db").to_string_lossy().into_owned(),
            memory_dir: dir.join("memory").to_string_lossy().into_owned(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 1600,
            overlap_chars: 320,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            rrf_k: 60,
            candidate_multiplier: 3,
        }
    }
}

/// Returns `~/.memdex/`, or `./.memdex/` when no home directory is known.
pub fn default_memdex_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memdex")
}

/// Returns the default config file path: `~/.memdex/config.toml`
pub fn default_config_path() -> PathBuf {
    default_memdex_dir().join("config.toml")
}

impl MemdexConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemdexConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MEMDEX_DB, MEMDEX_MEMORY_DIR, MEMDEX_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEMDEX_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MEMDEX_MEMORY_DIR") {
            self.storage.memory_dir = val;
        }
        if let Ok(val) = std::env::var("MEMDEX_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_memory_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.memory_dir)
    }

    pub fn index_settings(&self) -> IndexSettings {
        IndexSettings {
            chunking: self.chunking.clone(),
            search: self.search.clone(),
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MemdexConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.search.rrf_k, 60);
        assert_eq!(config.search.default_limit, 10);
        assert!(config.chunking.overlap_chars > 0);
        assert!(config.chunking.overlap_chars * 2 < config.chunking.max_chars);
        assert!(config.storage.db_path.ends_with("memory.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[logging]
level = "debug"

[storage]
db_path = "/tmp/agent-a.db"

[chunking]
max_chars = 800

[search]
default_limit = 5
"#;
        let config: MemdexConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/agent-a.db");
        assert_eq!(config.chunking.max_chars, 800);
        assert_eq!(config.search.default_limit, 5);
        // defaults still apply for unset fields
        assert_eq!(config.chunking.overlap_chars, 320);
        assert_eq!(config.search.rrf_k, 60);
        assert!(config.storage.memory_dir.ends_with("memory"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = MemdexConfig::default();
        std::env::set_var("MEMDEX_DB", "/tmp/override.db");
        std::env::set_var("MEMDEX_MEMORY_DIR", "/tmp/notes");
        std::env::set_var("MEMDEX_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.storage.memory_dir, "/tmp/notes");
        assert_eq!(config.logging.level, "trace");

        // Clean up
        std::env::remove_var("MEMDEX_DB");
        std::env::remove_var("MEMDEX_MEMORY_DIR");
        std::env::remove_var("MEMDEX_LOG_LEVEL");
    }

    #[test]
    fn index_settings_mirror_config() {
        let mut config = MemdexConfig::default();
        config.search.rrf_k = 10;
        let settings = config.index_settings();
        assert_eq!(settings.search.rrf_k, 10);
        assert_eq!(settings.chunking, config.chunking);
    }
}
