//! Configuration file handling.
//!
//! Settings come from `~/.fieldmetrics/config.toml` (or `--config`). A
//! missing default file means built-in defaults; every section and field is
//! optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::aggregator::AggregateOptions;
use crate::services::dashboard::Settings;
use crate::types::{FieldMetricsError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where records come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Aggregation knobs.
    #[serde(default)]
    pub aggregate: AggregateOptions,

    /// Snapshot cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Module toggles and per-role panel visibility.
    #[serde(default)]
    pub dashboard: Settings,
}

/// Kind of record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// JSON files matched by a glob pattern
    #[default]
    Files,
    /// REST table endpoint
    Rest,
    /// Built-in placeholder dataset only
    Placeholder,
}

/// Record source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Glob pattern for `files` sources.
    #[serde(default = "default_glob")]
    pub glob: String,

    /// Service base URL for `rest` sources (e.g. `https://xyz.example.co`).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Table holding installation records.
    #[serde(default = "default_table")]
    pub table: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Rows requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            glob: default_glob(),
            base_url: None,
            table: default_table(),
            api_key_env: default_api_key_env(),
            page_size: default_page_size(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_glob() -> String {
    "data/*.json".to_string()
}

fn default_table() -> String {
    "instalaciones".to_string()
}

fn default_api_key_env() -> String {
    "FIELDMETRICS_API_KEY".to_string()
}

fn default_page_size() -> usize {
    1000
}

fn default_timeout() -> u64 {
    30
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Keep a snapshot of the last good fetch.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Snapshot directory; defaults to `~/.fieldmetrics/cache`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            dir: None,
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and built-in defaults are used when it is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FieldMetricsError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| FieldMetricsError::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// `~/.fieldmetrics/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".fieldmetrics").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.source.page_size == 0 {
            return Err(FieldMetricsError::Config(
                "source.page_size must be greater than 0".into(),
            ));
        }
        if self.source.kind == SourceKind::Rest && self.source.base_url.is_none() {
            return Err(FieldMetricsError::Config(
                "source.base_url is required for rest sources".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dashboard::Panel;
    use crate::types::{Dimension, TieBreak};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.kind, SourceKind::Files);
        assert_eq!(config.source.page_size, 1000);
        assert_eq!(config.source.table, "instalaciones");
        assert!(config.cache.enabled);
        assert_eq!(config.aggregate.leaderboard_dimension, Dimension::Advisor);
        assert!(config.dashboard.modules.installations);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.source.glob, "data/*.json");
        assert_eq!(config.aggregate.new_service_status, "NUEVO SERVICIO");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [source]
            kind = "rest"
            base_url = "https://records.example.com"
            table = "installs"
            page_size = 500

            [aggregate]
            leaderboard_dimension = "sector"
            tie_break = "alphabetical"

            [cache]
            enabled = false

            [dashboard]
            hidden_panels = ["daily"]

            [dashboard.modules]
            installations = false
            fleet = false

            [dashboard.panels]
            gerente = ["counters", "trend"]
        "#;

        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.source.kind, SourceKind::Rest);
        assert_eq!(config.source.table, "installs");
        assert_eq!(config.source.page_size, 500);
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.aggregate.leaderboard_dimension, Dimension::Sector);
        assert_eq!(config.aggregate.tie_break, TieBreak::Alphabetical);
        assert_eq!(config.aggregate.new_service_status, "NUEVO SERVICIO");
        assert!(!config.cache.enabled);
        assert!(!config.dashboard.modules.installations);
        assert_eq!(config.dashboard.hidden_panels, vec![Panel::Daily]);
        assert_eq!(
            config.dashboard.panels.get("gerente"),
            Some(&vec![Panel::Counters, Panel::Trend])
        );
    }

    #[test]
    fn test_rest_requires_base_url() {
        let err = Config::from_toml("[source]\nkind = \"rest\"").unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(Config::from_toml("[source]\npage_size = 0").is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[source\nkind=").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }

    #[test]
    fn test_explicit_missing_path_errors() {
        let tmp = TempDir::new().unwrap();
        let result = Config::load(Some(&tmp.path().join("nope.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[source]\nglob = \"exports/*.json\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.source.glob, "exports/*.json");
    }
}
