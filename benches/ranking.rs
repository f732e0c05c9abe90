use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use modelscout::config::{CacheSettings, SearchSettings};
use modelscout::recommend::UserActivity;
use modelscout::{
    CatalogItem, Metrics, RecommendationContext, RecommendationEngine, ScoringWeights,
    SearchEngine, SearchOptions, SortCriterion, SortDirection, SortEngine, SortField,
};
use std::hint::black_box;
use std::sync::Arc;

const PROVIDERS: [&str; 5] = ["openai", "anthropic", "meta", "mistral", "google"];
const CATEGORIES: [&str; 4] = ["chat", "code", "multimodal", "embedding"];

fn catalog(size: usize) -> Vec<CatalogItem> {
    (0..size)
        .map(|i| {
            let mut item = CatalogItem::new(
                &format!("model-{i}"),
                &format!("{}-{} v{}", PROVIDERS[i % 5], CATEGORIES[i % 4], i % 17),
                PROVIDERS[i % 5],
                CATEGORIES[i % 4],
            )
            .with_description("General purpose language model with tool use")
            .with_capabilities(&["chat", "code", "vision"][..(i % 3) + 1])
            .with_parameters(1e9 * (1 + i % 400) as f64)
            .with_context_window(8_000.0 * (1 + i % 25) as f64);
            if i % 7 != 0 {
                item.cost = Some((i % 97) as f64 / 1000.0);
            }
            item
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let items = catalog(2_000);
    let metrics = Arc::new(Metrics::new());

    // zero TTL so every iteration ranks from scratch
    let uncached = CacheSettings {
        search_ttl_secs: 0,
        sort_ttl_secs: 0,
        ..CacheSettings::default()
    };

    let search = SearchEngine::new(SearchSettings::default(), &uncached, metrics.clone());
    c.bench_function("search_fuzzy_2k", |b| {
        b.iter(|| search.search(black_box(&items), black_box("antropic chat"), &SearchOptions::default()))
    });

    let sort = SortEngine::new(&uncached, metrics.clone());
    let criteria = [
        SortCriterion::new(SortField::Provider, SortDirection::Asc, 2),
        SortCriterion::new(SortField::Cost, SortDirection::Desc, 1),
    ];
    c.bench_function("sort_multi_2k", |b| {
        b.iter(|| sort.sort_multi(black_box(&items), &criteria))
    });

    let mut activity = UserActivity::default();
    for i in (0..200).step_by(3) {
        activity.view(&format!("model-{i}"));
    }
    activity.favorite("model-12");
    activity.favorite("model-40");
    activity.searches = vec!["meta".to_string(), "code".to_string()];
    let context = RecommendationContext::new(&items, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        .with_activity(activity);
    let recommend = RecommendationEngine::new(ScoringWeights::default(), metrics);
    c.bench_function("recommend_2k", |b| {
        b.iter(|| recommend.recommend(black_box(&context), 20))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
