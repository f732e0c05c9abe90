//! Relevance search over a catalog snapshot with fuzzy matching,
//! highlighting, suggestions and bounded history
pub mod debounce;
pub mod engine;
pub mod fuzzy;
pub mod highlight;
pub mod history;
pub mod suggest;

use crate::catalog::CatalogItem;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use debounce::{CommittedSearch, DebouncedSearch, SearchHandle, SearchOutcome};
pub use engine::SearchEngine;
pub use highlight::{highlight, Segment};
pub use history::{HistoryEntry, SearchHistory};
pub use suggest::{Suggestion, SuggestionKind};

/// Searchable fields, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Name,
    Provider,
    Category,
    Description,
}

impl SearchField {
    pub const ORDERED: [SearchField; 4] = [
        SearchField::Name,
        SearchField::Provider,
        SearchField::Category,
        SearchField::Description,
    ];

    pub fn value<'a>(&self, item: &'a CatalogItem) -> &'a str {
        match self {
            SearchField::Name => &item.name,
            SearchField::Provider => &item.provider,
            SearchField::Category => &item.category,
            SearchField::Description => &item.description,
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchField::Name => write!(f, "name"),
            SearchField::Provider => write!(f, "provider"),
            SearchField::Category => write!(f, "category"),
            SearchField::Description => write!(f, "description"),
        }
    }
}

/// Per-field weights combined into the composite score. The defaults sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub name: f64,
    pub provider: f64,
    pub category: f64,
    pub description: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: 0.5,
            provider: 0.2,
            category: 0.15,
            description: 0.15,
        }
    }
}

impl FieldWeights {
    pub fn weight(&self, field: SearchField) -> f64 {
        match field {
            SearchField::Name => self.name,
            SearchField::Provider => self.provider,
            SearchField::Category => self.category,
            SearchField::Description => self.description,
        }
    }
}

/// Per-call search options
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub fuzzy: bool,
    pub threshold: f64,
    pub limit: usize,
    pub include_matches: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            threshold: 0.7,
            limit: 50,
            include_matches: true,
        }
    }
}

impl SearchOptions {
    pub fn exact() -> Self {
        Self {
            fuzzy: false,
            ..Self::default()
        }
    }
}

/// How a field matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Prefix,
    Word,
    Substring,
    Fuzzy,
}

/// A single field that contributed to an item's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field: SearchField,
    pub kind: MatchKind,
    /// The matched text as it appears in the field, for highlighting.
    pub matched: String,
    /// Byte offset of `matched` within the field value.
    pub start: usize,
    pub score: f64,
}

/// Owned, index-addressed search hit. This is what caches and the debouncer
/// hold; resolve it against the snapshot it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub index: usize,
    pub id: String,
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

impl SearchHit {
    pub fn resolve<'a>(&self, items: &'a [CatalogItem]) -> Option<RankedResult<'a>> {
        items
            .get(self.index)
            .filter(|item| item.id == self.id)
            .map(|item| RankedResult {
                item,
                score: self.score,
                matches: self.matches.clone(),
            })
    }
}

/// Ranked search result borrowing the catalog item
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult<'a> {
    pub item: &'a CatalogItem,
    pub score: f64,
    pub matches: Vec<FieldMatch>,
}

impl RankedResult<'_> {
    pub fn match_for(&self, field: SearchField) -> Option<&FieldMatch> {
        self.matches.iter().find(|m| m.field == field)
    }
}

/// Strips control characters and surrounding whitespace from a raw query.
pub fn sanitize_query(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
