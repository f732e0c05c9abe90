use chrono::{TimeZone, Utc};
use modelscout::config::{CacheSettings, SearchSettings};
use modelscout::filter::{has_active_filters, summarize, CostRange};
use modelscout::recommend::{UserActivity, UserPreferences};
use modelscout::{
    CatalogItem, FilterCriteria, Metrics, RecommendationContext, RecommendationEngine,
    ScoringWeights, SearchEngine, SearchOptions, SortDirection, SortEngine, SortField,
};
use std::sync::Arc;

fn ids(items: &[&CatalogItem]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

#[test]
fn missing_cost_sorts_last_in_both_directions() {
    let mut a = CatalogItem::new("a", "A", "p", "c");
    a.cost = Some(0.0);
    let mut b = CatalogItem::new("b", "B", "p", "c");
    b.cost = Some(0.01);
    let c = CatalogItem::new("c", "C", "p", "c");
    let items = vec![a, b, c];

    let engine = SortEngine::new(&CacheSettings::default(), Arc::new(Metrics::new()));
    assert_eq!(
        ids(&engine.sort(&items, SortField::Cost, SortDirection::Asc)),
        vec!["a", "b", "c"]
    );
    assert_eq!(
        ids(&engine.sort(&items, SortField::Cost, SortDirection::Desc)),
        vec!["b", "a", "c"]
    );
}

#[test]
fn exact_search_for_gpt_excludes_claude() {
    let items = vec![
        CatalogItem::new("gpt4", "GPT-4", "openai", "chat"),
        CatalogItem::new("gpt35", "GPT-3.5", "openai", "chat"),
        CatalogItem::new("claude3", "Claude-3", "anthropic", "chat"),
    ];
    let engine = SearchEngine::new(
        SearchSettings::default(),
        &CacheSettings::default(),
        Arc::new(Metrics::new()),
    );

    let results = engine.search(&items, "gpt", &SearchOptions::exact());
    let mut found: Vec<&str> = results.iter().map(|r| r.item.id.as_str()).collect();
    found.sort_unstable();
    assert_eq!(found, vec!["gpt35", "gpt4"]);
}

#[test]
fn short_and_malformed_queries_return_nothing() {
    let items = vec![CatalogItem::new("gpt4", "GPT-4", "openai", "chat")];
    let engine = SearchEngine::new(
        SearchSettings::default(),
        &CacheSettings::default(),
        Arc::new(Metrics::new()),
    );
    assert!(engine.search(&items, "g", &SearchOptions::default()).is_empty());
    assert!(engine.search(&items, "", &SearchOptions::default()).is_empty());
    assert!(engine
        .search(&items, "\u{7}\u{0}", &SearchOptions::default())
        .is_empty());
}

#[test]
fn active_filter_detection() {
    assert!(!has_active_filters(&FilterCriteria::default()));
    assert!(has_active_filters(&FilterCriteria {
        providers: vec!["openai".to_string()],
        ..Default::default()
    }));
}

#[test]
fn summarize_is_idempotent() {
    let criteria = FilterCriteria {
        categories: vec!["chat".to_string()],
        cost_range: Some(CostRange {
            min: Some(0.001),
            max: Some(0.01),
        }),
        min_accuracy: Some(0.9),
        ..Default::default()
    };
    let first = summarize(&criteria);
    assert_eq!(first.len(), 3);
    assert_eq!(summarize(&criteria), first);
}

#[test]
fn favorite_with_preferred_provider_outranks_twin() {
    let items = vec![
        CatalogItem::new("x", "Model", "openai", "chat"),
        CatalogItem::new("y", "Model", "anthropic", "chat"),
    ];
    let mut activity = UserActivity::default();
    activity.favorite("x");
    let context = RecommendationContext::new(&items, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        .with_activity(activity)
        .with_preferences(UserPreferences {
            providers: vec!["openai".to_string()],
            ..Default::default()
        });

    let engine = RecommendationEngine::new(ScoringWeights::default(), Arc::new(Metrics::new()));
    let x = engine.score(&items[0], &context);
    let y = engine.score(&items[1], &context);
    assert!(x.score > y.score, "{} <= {}", x.score, y.score);
}

#[test]
fn similarity_is_neutral_without_favorites() {
    let items = vec![
        CatalogItem::new("a", "Alpha", "openai", "chat").with_parameters(7e9),
        CatalogItem::new("b", "Beta", "meta", "code"),
    ];
    let context = RecommendationContext::new(&items, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    let engine = RecommendationEngine::new(ScoringWeights::default(), Arc::new(Metrics::new()));
    for rec in engine.recommend(&context, 10) {
        assert_eq!(rec.breakdown.similarity, 0.5);
    }
    assert!((engine.weights().top_level_sum() - 1.0).abs() < 1e-12);
}
