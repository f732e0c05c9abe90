//! Persistence for saved filters and search history
//!
//! Engines never touch storage directly. Callers hand them a
//! [`PreferencesStore`] and decide what to do when it fails; the helpers here
//! log the failure and fall back to defaults.
use crate::error::{Result, ScoutError};
use crate::filter::FilterCriteria;
use crate::search::HistoryEntry;
use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait PreferencesStore: Send + Sync {
    fn load_filters(&self) -> Result<Option<FilterCriteria>>;
    fn save_filters(&self, criteria: &FilterCriteria) -> Result<()>;
    fn load_history(&self) -> Result<Vec<HistoryEntry>>;
    fn save_history(&self, entries: &[HistoryEntry]) -> Result<()>;
}

/// Saved filters, or empty criteria when none are stored or the store fails.
pub fn load_filters_or_default(store: &dyn PreferencesStore) -> FilterCriteria {
    match store.load_filters() {
        Ok(Some(criteria)) => criteria,
        Ok(None) => FilterCriteria::default(),
        Err(e) => {
            warn!("Could not load saved filters: {e}");
            FilterCriteria::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct StoredPreferences {
    filters: Option<FilterCriteria>,
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryPreferences {
    state: Mutex<StoredPreferences>,
}

impl PreferencesStore for MemoryPreferences {
    fn load_filters(&self) -> Result<Option<FilterCriteria>> {
        Ok(self.state.lock().filters.clone())
    }

    fn save_filters(&self, criteria: &FilterCriteria) -> Result<()> {
        self.state.lock().filters = Some(criteria.clone());
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.state.lock().history.clone())
    }

    fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.state.lock().history = entries.to_vec();
        Ok(())
    }
}

/// Preferences kept in one JSON document on disk. A missing file reads as
/// empty; every save rewrites the whole document.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data dir>/modelscout/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("modelscout").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoredPreferences> {
        if !self.path.exists() {
            debug!("No preferences file at {}", self.path.display());
            return Ok(StoredPreferences::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(StoredPreferences::default());
        }
        serde_json::from_str(&raw).map_err(|e| {
            ScoutError::Preferences(format!("{}: {e}", self.path.display()))
        })
    }

    fn write(&self, stored: &StoredPreferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(stored)?)?;
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut StoredPreferences)) -> Result<()> {
        let _guard = self.lock.lock();
        let mut stored = self.read()?;
        change(&mut stored);
        self.write(&stored)
    }
}

impl PreferencesStore for JsonFilePreferences {
    fn load_filters(&self) -> Result<Option<FilterCriteria>> {
        let _guard = self.lock.lock();
        Ok(self.read()?.filters)
    }

    fn save_filters(&self, criteria: &FilterCriteria) -> Result<()> {
        self.update(|stored| stored.filters = Some(criteria.clone()))
    }

    fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        let _guard = self.lock.lock();
        Ok(self.read()?.history)
    }

    fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        self.update(|stored| stored.history = entries.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn entry(query: &str) -> HistoryEntry {
        HistoryEntry {
            query: query.to_string(),
            result_count: 3,
            searched_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_json_file_keeps_both_sections() {
        let dir = tempdir().unwrap();
        let store = JsonFilePreferences::new(dir.path().join("nested").join("prefs.json"));
        assert_eq!(store.load_filters().unwrap(), None);
        assert!(store.load_history().unwrap().is_empty());

        let criteria = FilterCriteria {
            providers: vec!["openai".to_string()],
            min_accuracy: Some(0.8),
            ..Default::default()
        };
        store.save_filters(&criteria).unwrap();
        store.save_history(&[entry("gpt"), entry("claude")]).unwrap();

        let reopened = JsonFilePreferences::new(store.path().to_path_buf());
        assert_eq!(reopened.load_filters().unwrap(), Some(criteria));
        assert_eq!(reopened.load_history().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFilePreferences::new(&path);
        assert!(matches!(store.load_filters(), Err(ScoutError::Preferences(_))));
    }

    #[test]
    fn test_load_filters_falls_back_on_failure() {
        testing_logger::setup();
        let mut store = MockPreferencesStore::new();
        store
            .expect_load_filters()
            .returning(|| Err(ScoutError::Preferences("locked".to_string())));

        assert_eq!(load_filters_or_default(&store), FilterCriteria::default());
        testing_logger::validate(|logs| {
            assert!(logs
                .iter()
                .any(|l| l.level == log::Level::Warn && l.body.contains("locked")));
        });
    }

    #[test]
    fn test_memory_round_trip() {
        let store = MemoryPreferences::default();
        store.save_history(&[entry("llama")]).unwrap();
        assert_eq!(store.load_history().unwrap(), vec![entry("llama")]);
        assert_eq!(load_filters_or_default(&store), FilterCriteria::default());
    }
}
