//! Core search engine implementation
use crate::cache::{snapshot_fingerprint, ResultCache};
use crate::catalog::CatalogItem;
use crate::config::{CacheSettings, SearchSettings};
use crate::metrics::Metrics;
use crate::preferences::PreferencesStore;
use crate::search::history::{HistoryEntry, SearchHistory};
use crate::search::suggest::{suggestions, Suggestion};
use crate::search::{
    fuzzy, sanitize_query, FieldMatch, MatchKind, RankedResult, SearchField, SearchHit,
    SearchOptions,
};
use log::{debug, warn};
use parking_lot::Mutex;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const EXACT_SCORE: f64 = 1.0;
const PREFIX_SCORE: f64 = 0.9;
const WORD_SCORE: f64 = 0.8;
const SUBSTRING_SCORE: f64 = 0.7;
/// Fuzzy similarity is scaled below the weakest exact match.
const FUZZY_SCALE: f64 = 0.6;

/// Cache key for search results
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub query: String,
    pub fuzzy: bool,
    pub threshold_bits: u64,
    pub limit: usize,
    pub include_matches: bool,
    pub snapshot: u64,
}

/// Relevance scorer with a result cache and bounded query history
pub struct SearchEngine {
    settings: SearchSettings,
    cache: Arc<ResultCache<SearchKey, Arc<Vec<SearchHit>>>>,
    history: Mutex<SearchHistory>,
    metrics: Arc<Metrics>,
}

impl SearchEngine {
    pub fn new(settings: SearchSettings, cache: &CacheSettings, metrics: Arc<Metrics>) -> Self {
        let history = SearchHistory::new(settings.history_capacity);
        Self {
            settings,
            cache: Arc::new(ResultCache::new(cache.capacity, cache.search_ttl())),
            history: Mutex::new(history),
            metrics,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Options seeded from the configured defaults
    pub fn default_options(&self) -> SearchOptions {
        SearchOptions {
            threshold: self.settings.default_threshold,
            limit: self.settings.default_limit,
            ..SearchOptions::default()
        }
    }

    /// Shared handle to the result cache, e.g. for a [`crate::cache::CacheSweeper`].
    pub fn cache(&self) -> Arc<ResultCache<SearchKey, Arc<Vec<SearchHit>>>> {
        self.cache.clone()
    }

    /// Ranks `items` against `query`, best first.
    pub fn search<'a>(
        &self,
        items: &'a [CatalogItem],
        query: &str,
        options: &SearchOptions,
    ) -> Vec<RankedResult<'a>> {
        self.search_hits(items, query, options)
            .iter()
            .filter_map(|hit| hit.resolve(items))
            .collect()
    }

    /// Index-addressed form of [`SearchEngine::search`], served from cache when possible.
    pub fn search_hits(
        &self,
        items: &[CatalogItem],
        query: &str,
        options: &SearchOptions,
    ) -> Arc<Vec<SearchHit>> {
        let query = sanitize_query(query);
        if query.chars().count() < self.settings.min_query_length || options.limit == 0 {
            return Arc::new(Vec::new());
        }

        let key = SearchKey {
            query: query.to_lowercase(),
            fuzzy: options.fuzzy,
            threshold_bits: options.threshold.to_bits(),
            limit: options.limit,
            include_matches: options.include_matches,
            snapshot: searched_fingerprint(items),
        };
        if let Some(hits) = self.cache.get(&key) {
            debug!("Search cache hit for '{query}'");
            self.metrics.search_cache_hits.inc();
            return hits;
        }
        self.metrics.cache_misses.inc();
        self.metrics.searches.inc();

        let hits = Arc::new(self.rank(items, &query, options));
        debug!("Search '{query}' ranked {} of {} items", hits.len(), items.len());
        self.cache.set(key, hits.clone());
        hits
    }

    fn rank(&self, items: &[CatalogItem], query: &str, options: &SearchOptions) -> Vec<SearchHit> {
        let pattern = match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern,
            Err(e) => {
                debug!("Query '{query}' cannot be matched: {e}");
                return Vec::new();
            }
        };

        let mut hits: Vec<SearchHit> = items
            .par_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let matches = self.score_fields(item, query, &pattern, options);
                let score: f64 = matches
                    .iter()
                    .map(|m| self.settings.field_weights.weight(m.field) * m.score)
                    .sum::<f64>()
                    .clamp(0.0, 1.0);
                if matches.is_empty() || score < self.settings.score_floor {
                    return None;
                }
                Some(SearchHit {
                    index,
                    id: item.id.clone(),
                    score,
                    matches: if options.include_matches {
                        matches
                    } else {
                        Vec::new()
                    },
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(options.limit);
        hits
    }

    fn score_fields(
        &self,
        item: &CatalogItem,
        query: &str,
        pattern: &Regex,
        options: &SearchOptions,
    ) -> Vec<FieldMatch> {
        SearchField::ORDERED
            .iter()
            .filter_map(|field| {
                let value = field.value(item);
                exact_match(*field, value, pattern).or_else(|| {
                    if options.fuzzy {
                        approximate_match(*field, value, query, options.threshold)
                    } else {
                        None
                    }
                })
            })
            .collect()
    }

    /// Distinct matching terms with occurrence counts.
    pub fn get_suggestions(
        &self,
        items: &[CatalogItem],
        partial: &str,
        max: usize,
    ) -> Vec<Suggestion> {
        suggestions(items, partial, max)
    }

    pub fn track_query(&self, query: &str, result_count: usize) {
        self.history.lock().track(&sanitize_query(query), result_count);
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().entries().to_vec()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// Replaces the history from the preferences store. Store failures are
    /// logged and leave the current history untouched.
    pub fn restore_history(&self, store: &dyn PreferencesStore) -> usize {
        match store.load_history() {
            Ok(entries) => {
                let mut history = self.history.lock();
                history.replace(entries);
                history.len()
            }
            Err(e) => {
                warn!("Could not restore search history: {e}");
                0
            }
        }
    }

    /// Writes the history to the preferences store, logging any failure.
    pub fn persist_history(&self, store: &dyn PreferencesStore) -> bool {
        let entries = self.history();
        match store.save_history(&entries) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not persist search history: {e}");
                false
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Ids plus every searched field, in order. Any edit to searchable text
/// changes the key.
fn searched_fingerprint(items: &[CatalogItem]) -> u64 {
    let mut hasher = DefaultHasher::new();
    snapshot_fingerprint(items).hash(&mut hasher);
    for item in items {
        for field in SearchField::ORDERED {
            field.value(item).hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Strongest occurrence of `pattern` in `value`; the earliest wins a tie.
fn exact_match(field: SearchField, value: &str, pattern: &Regex) -> Option<FieldMatch> {
    let mut best: Option<FieldMatch> = None;
    for found in pattern.find_iter(value) {
        let (kind, score) = if found.start() == 0 && found.end() == value.len() {
            (MatchKind::Exact, EXACT_SCORE)
        } else if found.start() == 0 {
            (MatchKind::Prefix, PREFIX_SCORE)
        } else if value[..found.start()]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_alphanumeric())
        {
            (MatchKind::Word, WORD_SCORE)
        } else {
            (MatchKind::Substring, SUBSTRING_SCORE)
        };

        if best.as_ref().map_or(true, |current| score > current.score) {
            best = Some(FieldMatch {
                field,
                kind,
                matched: found.as_str().to_string(),
                start: found.start(),
                score,
            });
        }
    }
    best
}

fn approximate_match(
    field: SearchField,
    value: &str,
    query: &str,
    threshold: f64,
) -> Option<FieldMatch> {
    if !threshold.is_finite() {
        return None;
    }
    let best = fuzzy::best_match(value, query)?;
    if best.similarity < threshold {
        return None;
    }
    Some(FieldMatch {
        field,
        kind: MatchKind::Fuzzy,
        matched: best.fragment.to_string(),
        start: best.start,
        score: FUZZY_SCALE * best.similarity,
    })
}
