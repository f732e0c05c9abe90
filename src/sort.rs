//! Single- and multi-criterion stable sorting of catalog items
use crate::cache::{snapshot_fingerprint, ResultCache};
use crate::catalog::{parse_timestamp, CatalogItem};
use crate::config::CacheSettings;
use crate::error::{Result, ScoutError};
use crate::metrics::Metrics;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed};
use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

lazy_static! {
    // Root locale, secondary strength: accents matter, case does not.
    static ref COLLATOR: Option<CollatorBorrowed<'static>> = {
        let mut options = CollatorOptions::default();
        options.strength = Some(Strength::Secondary);
        Collator::try_new(Default::default(), options).ok()
    };
}

/// Locale-aware, case-insensitive string ordering.
pub fn collate(a: &str, b: &str) -> Ordering {
    match COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Provider,
    Category,
    Accuracy,
    Speed,
    Cost,
    Popularity,
    Parameters,
    ContextWindow,
    ReleaseDate,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 11] = [
        SortField::Name,
        SortField::Provider,
        SortField::Category,
        SortField::Accuracy,
        SortField::Speed,
        SortField::Cost,
        SortField::Popularity,
        SortField::Parameters,
        SortField::ContextWindow,
        SortField::ReleaseDate,
        SortField::UpdatedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Provider => "provider",
            SortField::Category => "category",
            SortField::Accuracy => "accuracy",
            SortField::Speed => "speed",
            SortField::Cost => "cost",
            SortField::Popularity => "popularity",
            SortField::Parameters => "parameters",
            SortField::ContextWindow => "context_window",
            SortField::ReleaseDate => "release_date",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ScoutError;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase().replace('-', "_");
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .or(match normalized.as_str() {
                "contextwindow" | "context" => Some(SortField::ContextWindow),
                "released" | "released_at" | "releasedate" => Some(SortField::ReleaseDate),
                "updated" | "updatedat" | "last_updated" => Some(SortField::UpdatedAt),
                "params" | "parameter_count" => Some(SortField::Parameters),
                _ => None,
            })
            .ok_or_else(|| ScoutError::UnknownField(raw.to_string()))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: SortField,
    pub direction: SortDirection,
    #[serde(default)]
    pub priority: i32,
}

impl SortCriterion {
    pub fn new(field: SortField, direction: SortDirection, priority: i32) -> Self {
        Self {
            field,
            direction,
            priority,
        }
    }
}

/// A comparable field value; absence is modelled as `None` by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
}

impl FieldValue {
    fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => collate(a, b),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Extracts a comparable value. Blank strings, non-finite numbers and
/// unparsable dates are all missing.
pub fn field_value(item: &CatalogItem, field: SortField) -> Option<FieldValue> {
    let text = |s: &str| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| FieldValue::Text(trimmed.to_string()))
    };
    let number = |n: Option<f64>| n.filter(|v| v.is_finite()).map(FieldValue::Number);
    let date = |raw: &Option<String>| {
        raw.as_deref()
            .and_then(parse_timestamp)
            .map(FieldValue::Date)
    };

    match field {
        SortField::Name => text(&item.name),
        SortField::Provider => text(&item.provider),
        SortField::Category => text(&item.category),
        SortField::Accuracy => number(item.accuracy),
        SortField::Speed => number(item.speed),
        SortField::Cost => number(item.cost),
        SortField::Popularity => number(item.popularity),
        SortField::Parameters => number(item.parameters),
        SortField::ContextWindow => number(item.context_window),
        SortField::ReleaseDate => date(&item.released_at),
        SortField::UpdatedAt => date(&item.updated_at),
    }
}

/// Missing values order after present ones whichever the direction.
pub fn compare_values(
    a: Option<&FieldValue>,
    b: Option<&FieldValue>,
    direction: SortDirection,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => direction.apply(a.compare(b)),
    }
}

pub fn compare_items(
    a: &CatalogItem,
    b: &CatalogItem,
    field: SortField,
    direction: SortDirection,
) -> Ordering {
    compare_values(
        field_value(a, field).as_ref(),
        field_value(b, field).as_ref(),
        direction,
    )
}

/// How much of a snapshot carries data for a field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    pub field: SortField,
    pub present: usize,
    pub total: usize,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SortKey {
    criteria: Vec<(SortField, SortDirection)>,
    snapshot: u64,
}

/// Sorting with a short-lived cache of computed orders
pub struct SortEngine {
    cache: Arc<ResultCache<SortKey, Arc<Vec<usize>>>>,
    metrics: Arc<Metrics>,
}

impl SortEngine {
    pub fn new(cache: &CacheSettings, metrics: Arc<Metrics>) -> Self {
        Self {
            cache: Arc::new(ResultCache::new(cache.capacity, cache.sort_ttl())),
            metrics,
        }
    }

    pub fn sort<'a>(
        &self,
        items: &'a [CatalogItem],
        field: SortField,
        direction: SortDirection,
    ) -> Vec<&'a CatalogItem> {
        self.apply_order(items, vec![(field, direction)])
    }

    /// Sorts by every criterion, highest priority first. Criteria with equal
    /// priority keep the order they were supplied in; items equal on all
    /// criteria keep their input order.
    pub fn sort_multi<'a>(
        &self,
        items: &'a [CatalogItem],
        criteria: &[SortCriterion],
    ) -> Vec<&'a CatalogItem> {
        let mut ordered: Vec<&SortCriterion> = criteria.iter().collect();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.apply_order(
            items,
            ordered.iter().map(|c| (c.field, c.direction)).collect(),
        )
    }

    fn apply_order<'a>(
        &self,
        items: &'a [CatalogItem],
        criteria: Vec<(SortField, SortDirection)>,
    ) -> Vec<&'a CatalogItem> {
        if criteria.is_empty() {
            return items.iter().collect();
        }

        let key = SortKey {
            criteria,
            snapshot: snapshot_fingerprint(items),
        };
        let order = match self.cache.get(&key) {
            Some(order) => {
                debug!("Sort cache hit for {:?}", key.criteria);
                self.metrics.sort_cache_hits.inc();
                order
            }
            None => {
                self.metrics.cache_misses.inc();
                let order = Arc::new(stable_order(items, &key.criteria));
                self.cache.set(key, order.clone());
                order
            }
        };

        order.iter().filter_map(|&i| items.get(i)).collect()
    }

    pub fn is_field_available(&self, items: &[CatalogItem], field: SortField) -> bool {
        items.iter().any(|item| field_value(item, field).is_some())
    }

    pub fn get_field_stats(&self, items: &[CatalogItem], field: SortField) -> FieldStats {
        let present = items
            .iter()
            .filter(|item| field_value(item, field).is_some())
            .count();
        FieldStats {
            field,
            present,
            total: items.len(),
            coverage: if items.is_empty() {
                0.0
            } else {
                present as f64 / items.len() as f64
            },
        }
    }

    /// Fields worth offering as sort options for this snapshot.
    pub fn available_fields(&self, items: &[CatalogItem]) -> Vec<SortField> {
        SortField::ALL
            .into_iter()
            .filter(|field| self.is_field_available(items, *field))
            .collect()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Decorate with index and extracted values, sort, undecorate. The index is
/// the final tie-breaker, so the result is stable even with an unstable sort.
fn stable_order(items: &[CatalogItem], criteria: &[(SortField, SortDirection)]) -> Vec<usize> {
    let mut decorated: Vec<(usize, Vec<Option<FieldValue>>)> = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let values = criteria
                .iter()
                .map(|(field, _)| field_value(item, *field))
                .collect();
            (index, values)
        })
        .collect();

    decorated.sort_unstable_by(|(ia, va), (ib, vb)| {
        criteria
            .iter()
            .enumerate()
            .map(|(k, (_, direction))| compare_values(va[k].as_ref(), vb[k].as_ref(), *direction))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
            .then(ia.cmp(ib))
    });

    decorated.into_iter().map(|(index, _)| index).collect()
}
