use crate::catalog::{CatalogItem, SizeBucket, TaskType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregated user activity. Ordered collections keep scoring reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserActivity {
    pub views: BTreeMap<String, u32>,
    pub searches: Vec<String>,
    pub favorites: BTreeSet<String>,
    pub comparisons: Vec<Vec<String>>,
}

impl UserActivity {
    pub fn view(&mut self, id: &str) {
        *self.views.entry(id.to_string()).or_insert(0) += 1;
    }

    pub fn favorite(&mut self, id: &str) {
        self.favorites.insert(id.to_string());
    }

    pub fn views_of(&self, id: &str) -> u32 {
        self.views.get(id).copied().unwrap_or(0)
    }

    pub fn max_views(&self) -> u32 {
        self.views.values().copied().max().unwrap_or(0)
    }

    pub fn total_views(&self) -> u64 {
        self.views.values().map(|v| u64::from(*v)).sum()
    }

    /// Views, searches, favorites and comparisons counted together.
    pub fn interaction_count(&self) -> u64 {
        self.total_views()
            + self.searches.len() as u64
            + self.favorites.len() as u64
            + self.comparisons.len() as u64
    }
}

/// Preferences the user declared explicitly. Empty fields are undeclared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub providers: Vec<String>,
    pub categories: Vec<String>,
    pub sizes: Vec<SizeBucket>,
    pub required_capabilities: Vec<String>,
    pub max_cost: Option<f64>,
}

impl UserPreferences {
    pub fn declared_count(&self) -> usize {
        [
            !self.providers.is_empty(),
            !self.categories.is_empty(),
            self.max_cost.is_some(),
            !self.sizes.is_empty(),
            !self.required_capabilities.is_empty(),
        ]
        .iter()
        .filter(|declared| **declared)
        .count()
    }
}

/// Activity plus preferences, as stored for a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub activity: UserActivity,
    pub preferences: UserPreferences,
}

/// Everything a recommendation depends on. `as_of` anchors recency so the
/// same context always produces the same scores.
#[derive(Debug, Clone)]
pub struct RecommendationContext<'a> {
    pub activity: UserActivity,
    pub preferences: UserPreferences,
    pub candidates: &'a [CatalogItem],
    pub task: Option<TaskType>,
    pub as_of: DateTime<Utc>,
}

impl<'a> RecommendationContext<'a> {
    pub fn new(candidates: &'a [CatalogItem], as_of: DateTime<Utc>) -> Self {
        Self {
            activity: UserActivity::default(),
            preferences: UserPreferences::default(),
            candidates,
            task: None,
            as_of,
        }
    }

    pub fn from_profile(
        profile: UserProfile,
        candidates: &'a [CatalogItem],
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            activity: profile.activity,
            preferences: profile.preferences,
            ..Self::new(candidates, as_of)
        }
    }

    pub fn with_activity(mut self, activity: UserActivity) -> Self {
        self.activity = activity;
        self
    }

    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_task(mut self, task: TaskType) -> Self {
        self.task = Some(task);
        self
    }
}
