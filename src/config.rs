use crate::recommend::ScoringWeights;
use crate::search::FieldWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub min_query_length: usize,
    pub score_floor: f64,
    pub default_threshold: f64,
    pub default_limit: usize,
    pub history_capacity: usize,
    pub debounce_ms: u64,
    pub field_weights: FieldWeights,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            score_floor: 0.05,
            default_threshold: 0.7,
            default_limit: 50,
            history_capacity: 20,
            debounce_ms: 250,
            field_weights: FieldWeights::default(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    #[serde(default = "default_sort_ttl")]
    pub sort_ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,
}

fn default_search_ttl() -> u64 {
    300
}
fn default_sort_ttl() -> u64 {
    30
}
fn default_capacity() -> usize {
    256
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            search_ttl_secs: default_search_ttl(),
            sort_ttl_secs: default_sort_ttl(),
            capacity: default_capacity(),
            sweep_interval_secs: None,
        }
    }
}

impl CacheSettings {
    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }

    pub fn sort_ttl(&self) -> Duration {
        Duration::from_secs(self.sort_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Config {
    /// Loads the first config file found, or defaults when none exists.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("modelscout/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".modelscout.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".modelscout.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [search]
            min_query_length = 3

            [weights]
            activity = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.search.min_query_length, 3);
        assert_eq!(config.search.history_capacity, 20);
        assert_eq!(config.cache.sort_ttl_secs, 30);
        assert_eq!(config.weights.activity, 0.5);
        assert_eq!(config.weights.preference, 0.3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = Config::default();
        config.cache.sweep_interval_secs = Some(60);

        config.save(&path).unwrap();
        let reloaded = Config::from_path(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.cache.sweep_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[search\nmin_query_length = ").unwrap();

        let err = Config::from_path(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.toml"));
    }
}
