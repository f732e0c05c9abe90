//! The four independent sub-scores. Each returns a value in [0,1].
use crate::catalog::CatalogItem;
use crate::recommend::context::RecommendationContext;
use crate::recommend::weights::{ActivityWeights, IntrinsicWeights, SimilarityWeights};
use std::collections::{BTreeSet, HashMap};

pub const NEUTRAL: f64 = 0.5;

const PARAMETER_LOG_CEILING: f64 = 12.0;
const PARAMETER_LOG_SPAN: f64 = 3.0;
const CONTEXT_WINDOW_CEILING: f64 = 200_000.0;
const RECENCY_WINDOW_DAYS: f64 = 365.0;
const CAPABILITY_CEILING: f64 = 10.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Context-wide values computed once per batch rather than per candidate.
pub struct ScoringFrame<'a> {
    pub max_views: f64,
    pub total_views: f64,
    pub searches: Vec<String>,
    pub favorites: Vec<&'a CatalogItem>,
    pub interactions: f64,
    by_id: HashMap<&'a str, &'a CatalogItem>,
}

impl<'a> ScoringFrame<'a> {
    pub fn new(context: &RecommendationContext<'a>) -> Self {
        let by_id: HashMap<&'a str, &'a CatalogItem> = context
            .candidates
            .iter()
            .map(|item| (item.id.as_str(), item))
            .collect();
        let favorites = context
            .activity
            .favorites
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect();
        let searches = context
            .activity
            .searches
            .iter()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty())
            .collect();

        Self {
            max_views: f64::from(context.activity.max_views()),
            total_views: context.activity.total_views() as f64,
            searches,
            favorites,
            interactions: context.activity.interaction_count() as f64,
            by_id,
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&'a CatalogItem> {
        self.by_id.get(id).copied()
    }
}

/// Normalized direct view count for the item.
pub fn direct_views(item: &CatalogItem, context: &RecommendationContext, frame: &ScoringFrame) -> f64 {
    if frame.max_views <= 0.0 {
        return 0.0;
    }
    unit(f64::from(context.activity.views_of(&item.id)) / frame.max_views)
}

pub fn activity(
    item: &CatalogItem,
    context: &RecommendationContext,
    frame: &ScoringFrame,
    weights: &ActivityWeights,
) -> f64 {
    let activity = &context.activity;
    let name = item.name.to_lowercase();
    let provider = item.provider.to_lowercase();

    let searches = if frame.searches.is_empty() {
        0.0
    } else {
        let hits = frame
            .searches
            .iter()
            .filter(|q| {
                name.contains(q.as_str())
                    || provider.contains(q.as_str())
                    || (!name.is_empty() && q.contains(&name))
            })
            .count();
        hits as f64 / frame.searches.len() as f64
    };

    let favorite = if activity.favorites.contains(&item.id) {
        1.0
    } else {
        0.0
    };

    let comparisons = if activity.comparisons.is_empty() {
        0.0
    } else {
        let groups = activity
            .comparisons
            .iter()
            .filter(|group| group.iter().any(|id| *id == item.id))
            .count();
        groups as f64 / activity.comparisons.len() as f64
    };

    let similar_views = if frame.total_views <= 0.0 {
        0.0
    } else {
        let related: u64 = activity
            .views
            .iter()
            .filter(|(id, _)| **id != item.id)
            .filter_map(|(id, views)| frame.lookup(id).map(|other| (other, views)))
            .filter(|(other, _)| {
                other.provider.eq_ignore_ascii_case(&item.provider)
                    || other.category.eq_ignore_ascii_case(&item.category)
            })
            .map(|(_, views)| u64::from(*views))
            .sum();
        related as f64 / frame.total_views
    };

    unit(
        weights.direct_views * direct_views(item, context, frame)
            + weights.searches * unit(searches)
            + weights.favorite * favorite
            + weights.comparisons * unit(comparisons)
            + weights.similar_views * unit(similar_views),
    )
}

/// Fraction of declared preference dimensions the item satisfies; neutral
/// when nothing is declared.
pub fn preference(item: &CatalogItem, context: &RecommendationContext) -> f64 {
    let prefs = &context.preferences;
    let mut declared = 0u32;
    let mut satisfied = 0u32;
    let mut check = |is_declared: bool, ok: bool| {
        if is_declared {
            declared += 1;
            if ok {
                satisfied += 1;
            }
        }
    };

    check(
        !prefs.providers.is_empty(),
        prefs
            .providers
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&item.provider)),
    );
    check(
        !prefs.categories.is_empty(),
        prefs
            .categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&item.category)),
    );
    check(
        prefs.max_cost.is_some(),
        match (prefs.max_cost, item.cost) {
            (Some(max), Some(cost)) => cost.is_finite() && cost <= max,
            _ => false,
        },
    );
    check(
        !prefs.sizes.is_empty(),
        item.size_bucket()
            .is_some_and(|bucket| prefs.sizes.contains(&bucket)),
    );
    check(
        !prefs.required_capabilities.is_empty(),
        prefs
            .required_capabilities
            .iter()
            .all(|c| item.has_capability(c)),
    );

    if declared == 0 {
        NEUTRAL
    } else {
        f64::from(satisfied) / f64::from(declared)
    }
}

/// Jaccard overlap of two capability sets, case-insensitive.
pub fn capability_overlap(a: &CatalogItem, b: &CatalogItem) -> f64 {
    let left: BTreeSet<String> = a.capabilities.iter().map(|c| c.to_lowercase()).collect();
    let right: BTreeSet<String> = b.capabilities.iter().map(|c| c.to_lowercase()).collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// Closeness of parameter counts on a log scale; neutral when either is unknown.
pub fn parameter_closeness(a: &CatalogItem, b: &CatalogItem) -> f64 {
    match (positive(a.parameters), positive(b.parameters)) {
        (Some(pa), Some(pb)) => unit(1.0 - (pa.log10() - pb.log10()).abs() / PARAMETER_LOG_SPAN),
        _ => NEUTRAL,
    }
}

pub fn pairwise_similarity(a: &CatalogItem, b: &CatalogItem, weights: &SimilarityWeights) -> f64 {
    let same = |x: &str, y: &str| if x.eq_ignore_ascii_case(y) { 1.0 } else { 0.0 };
    unit(
        weights.provider * same(&a.provider, &b.provider)
            + weights.category * same(&a.category, &b.category)
            + weights.parameters * parameter_closeness(a, b)
            + weights.capabilities * capability_overlap(a, b),
    )
}

/// Mean similarity to every favorited candidate; neutral without favorites.
pub fn similarity(item: &CatalogItem, frame: &ScoringFrame, weights: &SimilarityWeights) -> f64 {
    if frame.favorites.is_empty() {
        return NEUTRAL;
    }
    let total: f64 = frame
        .favorites
        .iter()
        .map(|favorite| pairwise_similarity(item, favorite, weights))
        .sum();
    unit(total / frame.favorites.len() as f64)
}

pub fn intrinsic(
    item: &CatalogItem,
    context: &RecommendationContext,
    weights: &IntrinsicWeights,
) -> f64 {
    let parameters = positive(item.parameters)
        .map(|p| unit(p.log10() / PARAMETER_LOG_CEILING))
        .unwrap_or(0.0);
    let context_window = positive(item.context_window)
        .map(|c| unit(c / CONTEXT_WINDOW_CEILING))
        .unwrap_or(0.0);
    let recency = item
        .freshest()
        .map(|at| {
            let age_days = (context.as_of - at).num_seconds() as f64 / SECONDS_PER_DAY;
            unit(1.0 - age_days.max(0.0) / RECENCY_WINDOW_DAYS)
        })
        .unwrap_or(0.0);
    let density = unit(item.capabilities.len() as f64 / CAPABILITY_CEILING);

    unit(
        weights.parameters * parameters
            + weights.context_window * context_window
            + weights.recency * recency
            + weights.capability_density * density,
    )
}

/// Mean of a data-volume term and the mean of activity and preference.
pub fn confidence(activity: f64, preference: f64, frame: &ScoringFrame, ceiling: f64) -> f64 {
    let volume = if ceiling > 0.0 {
        unit(frame.interactions / ceiling)
    } else {
        0.0
    };
    unit((volume + (activity + preference) / 2.0) / 2.0)
}
