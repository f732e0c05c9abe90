//! Filter criteria: activity checks, summaries and predicate application
//!
//! Fields combine with AND; values inside one set-valued field combine with
//! OR. An item lacking the data a constraint needs never satisfies it.
use crate::catalog::{format_parameter_count, format_token_count, CatalogItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl CostRange {
    pub fn contains(&self, cost: f64) -> bool {
        self.min.map_or(true, |min| cost >= min) && self.max.map_or(true, |max| cost <= max)
    }

    fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| instant >= from) && self.to.map_or(true, |to| instant <= to)
    }

    fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub providers: Vec<String>,
    pub categories: Vec<String>,
    pub capabilities: Vec<String>,
    pub cost_range: Option<CostRange>,
    pub min_accuracy: Option<f64>,
    pub min_parameters: Option<f64>,
    pub min_context_window: Option<f64>,
    pub available_only: Option<bool>,
    pub search_term: Option<String>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    fn term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    fn active_cost(&self) -> Option<&CostRange> {
        self.cost_range.as_ref().filter(|r| r.is_bounded())
    }

    fn active_dates(&self) -> Option<&DateRange> {
        self.date_range.as_ref().filter(|r| r.is_bounded())
    }

    fn availability_required(&self) -> bool {
        self.available_only == Some(true)
    }
}

pub fn has_active_filters(criteria: &FilterCriteria) -> bool {
    active_count(criteria) > 0
}

/// Number of fields currently constraining results.
pub fn active_count(criteria: &FilterCriteria) -> usize {
    [
        !criteria.providers.is_empty(),
        !criteria.categories.is_empty(),
        !criteria.capabilities.is_empty(),
        criteria.active_cost().is_some(),
        criteria.min_accuracy.is_some(),
        criteria.min_parameters.is_some(),
        criteria.min_context_window.is_some(),
        criteria.availability_required(),
        criteria.term().is_some(),
        criteria.active_dates().is_some(),
    ]
    .iter()
    .filter(|active| **active)
    .count()
}

/// One line per active field, always in declaration order.
pub fn summarize(criteria: &FilterCriteria) -> Vec<String> {
    let mut lines = Vec::new();

    if !criteria.providers.is_empty() {
        lines.push(format!("Providers: {}", criteria.providers.join(", ")));
    }
    if !criteria.categories.is_empty() {
        lines.push(format!("Categories: {}", criteria.categories.join(", ")));
    }
    if !criteria.capabilities.is_empty() {
        lines.push(format!("Capabilities: {}", criteria.capabilities.join(", ")));
    }
    if let Some(range) = criteria.active_cost() {
        lines.extend(match (range.min, range.max) {
            (Some(min), Some(max)) => Some(format!("Cost: ${min:.4} to ${max:.4} per 1K tokens")),
            (Some(min), None) => Some(format!("Cost: at least ${min:.4} per 1K tokens")),
            (None, Some(max)) => Some(format!("Cost: up to ${max:.4} per 1K tokens")),
            (None, None) => None,
        });
    }
    if let Some(accuracy) = criteria.min_accuracy {
        lines.push(format!("Min accuracy: {:.0}%", accuracy * 100.0));
    }
    if let Some(parameters) = criteria.min_parameters {
        lines.push(format!(
            "Min parameters: {}",
            format_parameter_count(parameters)
        ));
    }
    if let Some(tokens) = criteria.min_context_window {
        lines.push(format!("Min context window: {} tokens", format_token_count(tokens)));
    }
    if criteria.availability_required() {
        lines.push("Available models only".to_string());
    }
    if let Some(term) = criteria.term() {
        lines.push(format!("Search: \"{term}\""));
    }
    if let Some(range) = criteria.active_dates() {
        let day = |d: DateTime<Utc>| d.format("%Y-%m-%d").to_string();
        lines.extend(match (range.from, range.to) {
            (Some(from), Some(to)) => Some(format!("Released: {} to {}", day(from), day(to))),
            (Some(from), None) => Some(format!("Released: since {}", day(from))),
            (None, Some(to)) => Some(format!("Released: until {}", day(to))),
            (None, None) => None,
        });
    }

    lines
}

fn any_eq(wanted: &[String], value: &str) -> bool {
    wanted.iter().any(|w| w.trim().eq_ignore_ascii_case(value.trim()))
}

fn at_least(minimum: Option<f64>, value: Option<f64>) -> bool {
    match minimum {
        None => true,
        Some(min) => value.is_some_and(|v| v.is_finite() && v >= min),
    }
}

/// Whether `item` satisfies every active field of `criteria`.
pub fn matches(criteria: &FilterCriteria, item: &CatalogItem) -> bool {
    if !criteria.providers.is_empty() && !any_eq(&criteria.providers, &item.provider) {
        return false;
    }
    if !criteria.categories.is_empty() && !any_eq(&criteria.categories, &item.category) {
        return false;
    }
    if !criteria.capabilities.is_empty()
        && !criteria.capabilities.iter().any(|c| item.has_capability(c.trim()))
    {
        return false;
    }
    if let Some(range) = criteria.active_cost() {
        match item.cost {
            Some(cost) if cost.is_finite() && range.contains(cost) => {}
            _ => return false,
        }
    }
    if !at_least(criteria.min_accuracy, item.accuracy)
        || !at_least(criteria.min_parameters, item.parameters)
        || !at_least(criteria.min_context_window, item.context_window)
    {
        return false;
    }
    if criteria.availability_required() && item.available != Some(true) {
        return false;
    }
    if let Some(term) = criteria.term() {
        let term = term.to_lowercase();
        let found = [&item.name, &item.provider, &item.category, &item.description]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
            || item
                .capabilities
                .iter()
                .any(|c| c.to_lowercase().contains(&term));
        if !found {
            return false;
        }
    }
    if let Some(range) = criteria.active_dates() {
        match item.released() {
            Some(released) if range.contains(released) => {}
            _ => return false,
        }
    }
    true
}

/// Items satisfying `criteria`, in input order.
pub fn apply<'a>(items: &'a [CatalogItem], criteria: &FilterCriteria) -> Vec<&'a CatalogItem> {
    items.iter().filter(|item| matches(criteria, item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn catalog() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new("gpt4", "GPT-4", "openai", "chat")
                .with_capabilities(&["chat", "vision"])
                .with_cost(0.03)
                .with_accuracy(0.86)
                .with_released_at("2023-03-14")
                .with_availability(true),
            CatalogItem::new("claude", "Claude-3", "anthropic", "chat")
                .with_capabilities(&["chat"])
                .with_cost(0.015)
                .with_context_window(200_000.0)
                .with_released_at("2024-03-04"),
            CatalogItem::new("llama", "Llama-3", "meta", "open-weights")
                .with_parameters(70e9)
                .with_availability(true),
        ]
    }

    fn ids(found: &[&CatalogItem]) -> Vec<String> {
        found.iter().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn test_active_detection() {
        assert!(!has_active_filters(&FilterCriteria::default()));
        assert!(has_active_filters(&FilterCriteria {
            providers: vec!["openai".to_string()],
            ..Default::default()
        }));
        assert!(!has_active_filters(&FilterCriteria {
            available_only: Some(false),
            search_term: Some("   ".to_string()),
            cost_range: Some(CostRange::default()),
            ..Default::default()
        }));
        assert!(has_active_filters(&FilterCriteria {
            min_accuracy: Some(0.0),
            ..Default::default()
        }));
    }

    #[test]
    fn test_summary_order_and_idempotence() {
        let criteria = FilterCriteria {
            search_term: Some(" gpt ".to_string()),
            providers: vec!["openai".to_string(), "anthropic".to_string()],
            cost_range: Some(CostRange {
                min: None,
                max: Some(0.02),
            }),
            min_parameters: Some(7e9),
            min_context_window: Some(128_000.0),
            available_only: Some(true),
            ..Default::default()
        };
        let first = summarize(&criteria);
        assert_eq!(
            first,
            vec![
                "Providers: openai, anthropic",
                "Cost: up to $0.0200 per 1K tokens",
                "Min parameters: 7B",
                "Min context window: 128K tokens",
                "Available models only",
                "Search: \"gpt\"",
            ]
        );
        assert_eq!(summarize(&criteria), first);
        assert_eq!(active_count(&criteria), first.len());
    }

    #[test]
    fn test_and_across_or_within() {
        let items = catalog();
        let criteria = FilterCriteria {
            providers: vec!["OpenAI".to_string(), "anthropic".to_string()],
            capabilities: vec!["vision".to_string(), "audio".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&apply(&items, &criteria)), vec!["gpt4"]);
    }

    #[test]
    fn test_missing_data_excluded() {
        let items = catalog();
        let cheap = FilterCriteria {
            cost_range: Some(CostRange {
                min: Some(0.0),
                max: Some(0.02),
            }),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&items, &cheap)), vec!["claude"]);

        let big = FilterCriteria {
            min_parameters: Some(10e9),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&items, &big)), vec!["llama"]);

        let available = FilterCriteria {
            available_only: Some(true),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&items, &available)), vec!["gpt4", "llama"]);
    }

    #[test]
    fn test_term_and_dates() {
        let items = catalog();
        let term = FilterCriteria {
            search_term: Some("VISION".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&items, &term)), vec!["gpt4"]);

        let recent = FilterCriteria {
            date_range: Some(DateRange {
                from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                to: None,
            }),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&items, &recent)), vec!["claude"]);
        assert_eq!(summarize(&recent), vec!["Released: since 2024-01-01"]);
    }

    #[test]
    fn test_empty_criteria_pass_everything() {
        let items = catalog();
        assert_eq!(apply(&items, &FilterCriteria::default()).len(), 3);
    }
}
