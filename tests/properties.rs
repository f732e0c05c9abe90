use chrono::{TimeZone, Utc};
use modelscout::config::CacheSettings;
use modelscout::filter::{apply, matches};
use modelscout::recommend::{UserActivity, UserPreferences};
use modelscout::{
    CatalogItem, FilterCriteria, Metrics, RecommendationContext, RecommendationEngine,
    ScoringWeights, SortCriterion, SortDirection, SortEngine, SortField,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

fn sort_engine() -> SortEngine {
    // fresh per case: cached orders are keyed by id sequence
    SortEngine::new(&CacheSettings::default(), Arc::new(Metrics::new()))
}

fn priced(costs: &[Option<u32>]) -> Vec<CatalogItem> {
    costs
        .iter()
        .enumerate()
        .map(|(i, cost)| {
            let mut item = CatalogItem::new(&format!("m{i}"), &format!("Model {i}"), "p", "c");
            item.cost = cost.map(|c| f64::from(c) / 1000.0);
            item
        })
        .collect()
}

fn ids(items: &[&CatalogItem]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

fn position(id: &str) -> usize {
    id.trim_start_matches('m').parse().unwrap()
}

proptest! {
    #[test]
    fn desc_is_reverse_of_asc_without_ties(costs in prop::collection::hash_set(0u32..100_000, 1..40)) {
        let costs: Vec<Option<u32>> = costs.into_iter().map(Some).collect();
        let items = priced(&costs);
        let engine = sort_engine();

        let asc = ids(&engine.sort(&items, SortField::Cost, SortDirection::Asc));
        let mut desc = ids(&engine.sort(&items, SortField::Cost, SortDirection::Desc));
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn ties_keep_input_order(costs in prop::collection::vec(prop::option::of(0u32..3), 0..50)) {
        let items = priced(&costs);
        let engine = sort_engine();

        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let sorted = engine.sort(&items, SortField::Cost, direction);
            prop_assert_eq!(sorted.len(), items.len());
            for pair in sorted.windows(2) {
                if pair[0].cost == pair[1].cost {
                    prop_assert!(position(&pair[0].id) < position(&pair[1].id));
                }
            }
            let first_missing = sorted.iter().position(|i| i.cost.is_none()).unwrap_or(sorted.len());
            prop_assert!(sorted[first_missing..].iter().all(|i| i.cost.is_none()));
        }

        let multi = engine.sort_multi(&items, &[
            SortCriterion::new(SortField::Provider, SortDirection::Asc, 2),
            SortCriterion::new(SortField::Cost, SortDirection::Desc, 1),
        ]);
        for pair in multi.windows(2) {
            if pair[0].cost == pair[1].cost {
                prop_assert!(position(&pair[0].id) < position(&pair[1].id));
            }
        }
    }

    #[test]
    fn recommendation_scores_stay_in_unit_range(
        specs in prop::collection::vec(
            (prop::option::of(1e6f64..1e13), prop::option::of(0f64..2e6), 0usize..15, prop::option::of(0f64..1.0)),
            1..20,
        ),
        views in prop::collection::vec((0usize..20, 1u32..50), 0..10),
        favorite in prop::option::of(0usize..20),
        max_cost in prop::option::of(0f64..1.0),
    ) {
        let items: Vec<CatalogItem> = specs
            .iter()
            .enumerate()
            .map(|(i, (parameters, window, caps, cost))| {
                let capabilities: Vec<String> = (0..*caps).map(|c| format!("cap{c}")).collect();
                let mut item = CatalogItem::new(&format!("m{i}"), &format!("Model {i}"), if i % 2 == 0 { "openai" } else { "meta" }, "chat");
                item.parameters = *parameters;
                item.context_window = *window;
                item.capabilities = capabilities;
                item.cost = *cost;
                item.released_at = Some("2024-06-01".to_string());
                item
            })
            .collect();

        let mut activity = UserActivity::default();
        for (index, count) in &views {
            for _ in 0..*count {
                activity.view(&format!("m{index}"));
            }
        }
        if let Some(index) = favorite {
            activity.favorite(&format!("m{index}"));
        }
        activity.searches = vec!["model".to_string(), "openai".to_string()];

        let context = RecommendationContext::new(&items, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
            .with_activity(activity)
            .with_preferences(UserPreferences { max_cost, ..Default::default() });
        let engine = RecommendationEngine::new(ScoringWeights::default(), Arc::new(Metrics::new()));

        let ranked = engine.recommend(&context, items.len());
        prop_assert_eq!(ranked.len(), items.len());
        for rec in &ranked {
            prop_assert!((0.0..=1.0).contains(&rec.score));
            prop_assert!((0.0..=1.0).contains(&rec.confidence));
            prop_assert!(!rec.reasons.is_empty() && rec.reasons.len() <= 3);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        prop_assert_eq!(ranked, engine.recommend(&context, items.len()));
    }

    #[test]
    fn filter_keeps_matching_items_in_order(
        costs in prop::collection::vec(prop::option::of(0u32..100), 0..40),
        max in 0u32..100,
    ) {
        let items = priced(&costs);
        let criteria = FilterCriteria {
            cost_range: Some(modelscout::filter::CostRange { min: None, max: Some(f64::from(max) / 1000.0) }),
            ..Default::default()
        };
        let kept = apply(&items, &criteria);
        let expected: Vec<&CatalogItem> = items.iter().filter(|i| matches(&criteria, i)).collect();
        prop_assert_eq!(ids(&kept), ids(&expected));
        let unique: HashSet<&str> = kept.iter().map(|i| i.id.as_str()).collect();
        prop_assert_eq!(unique.len(), kept.len());
        prop_assert!(kept.iter().all(|i| i.cost.is_some()));
    }
}
