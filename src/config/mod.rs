//! Configuration loading for supersearch.

use std::path::PathBuf;
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "SUPERSEARCH_CONFIG";

/// Post types indexed when none are configured.
pub const DEFAULT_POST_TYPES: [&str; 3] = ["post", "page", "ce_projects"];

/// Snapshot location relative to the site root.
pub const DEFAULT_SNAPSHOT_PATH: &str = "./assets/json/supersearch.json";

/// Default number of suggestions shown per query.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Where the indexer reads content from and writes the snapshot to.
#[derive(Debug, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_snapshot")]
    pub output: String,
    #[serde(default = "default_post_types")]
    pub post_types: Vec<String>,
}

/// Suggestion engine settings.
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    /// Snapshot file path or `http(s)://` URL.
    #[serde(default = "default_snapshot")]
    pub snapshot: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_prefetch_ttl")]
    pub prefetch_ttl_secs: u64,
    /// Prefetch cache directory. Falls back to the platform cache dir.
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_retry_base")]
    pub retry_base_secs: u64,
    #[serde(default = "default_retry_max")]
    pub retry_max_secs: u64,
    /// Mark matched query text in suggestion titles.
    #[serde(default = "default_highlight")]
    pub highlight: bool,
}

fn default_source() -> String {
    "./content".to_string()
}

fn default_snapshot() -> String {
    DEFAULT_SNAPSHOT_PATH.to_string()
}

fn default_post_types() -> Vec<String> {
    DEFAULT_POST_TYPES.iter().map(ToString::to_string).collect()
}

fn default_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

fn default_prefetch_ttl() -> u64 {
    60
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_retry_base() -> u64 {
    1
}

fn default_retry_max() -> u64 {
    60
}

fn default_highlight() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_snapshot(),
            post_types: default_post_types(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            limit: default_limit(),
            prefetch_ttl_secs: default_prefetch_ttl(),
            cache_dir: None,
            fetch_timeout_secs: default_fetch_timeout(),
            retry_base_secs: default_retry_base(),
            retry_max_secs: default_retry_max(),
            highlight: default_highlight(),
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn prefetch_ttl(&self) -> Duration {
        Duration::from_secs(self.prefetch_ttl_secs)
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Resolved prefetch cache directory, if one can be determined.
    #[must_use]
    pub fn cache_dir(&self) -> Option<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Some(expand_tilde(dir)),
            None => ProjectDirs::from("", "", "supersearch")
                .map(|dirs| dirs.cache_dir().to_path_buf()),
        }
    }
}

impl Config {
    /// Load config from `$SUPERSEARCH_CONFIG` or
    /// ~/.config/supersearch/config.toml, or return defaults.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let contents = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            return Ok(config);
        }

        Ok(Config::default())
    }

    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }

        ProjectDirs::from("", "", "supersearch")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Expand ~ to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.search.limit, DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(config.index.post_types, vec!["post", "page", "ce_projects"]);
        assert_eq!(config.index.output, DEFAULT_SNAPSHOT_PATH);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str("[search]\nlimit = 8\n").unwrap();
        assert_eq!(config.search.limit, 8);
        assert_eq!(config.search.prefetch_ttl_secs, 60);
        assert!(config.search.highlight);
        assert_eq!(config.index.source, "./content");
    }

    #[test]
    fn explicit_cache_dir_is_expanded() {
        let config: Config = toml::from_str("[search]\ncache_dir = \"/tmp/ss\"\n").unwrap();
        assert_eq!(config.search.cache_dir(), Some(PathBuf::from("/tmp/ss")));
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("./content"), PathBuf::from("./content"));
    }
}
