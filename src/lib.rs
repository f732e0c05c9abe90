pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod output;
pub mod preferences;
pub mod recommend;
pub mod search;
pub mod sort;

pub use crate::cache::{CacheSweeper, ResultCache};
pub use crate::catalog::{load_snapshot, CatalogItem, SizeBucket, TaskType};
pub use crate::config::Config;
pub use crate::error::{Result, ScoutError};
pub use crate::filter::FilterCriteria;
pub use crate::metrics::Metrics;
pub use crate::preferences::{JsonFilePreferences, MemoryPreferences, PreferencesStore};
pub use crate::recommend::{
    RecommendationContext, RecommendationEngine, RecommendationScore, ScoringWeights,
};
pub use crate::search::{DebouncedSearch, RankedResult, SearchEngine, SearchOptions};
pub use crate::sort::{SortCriterion, SortDirection, SortEngine, SortField};
