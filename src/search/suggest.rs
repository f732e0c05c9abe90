use crate::catalog::CatalogItem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Where a suggested term came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Name,
    Provider,
    Category,
    Capability,
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionKind::Name => write!(f, "model"),
            SuggestionKind::Provider => write!(f, "provider"),
            SuggestionKind::Category => write!(f, "category"),
            SuggestionKind::Capability => write!(f, "capability"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub term: String,
    pub kind: SuggestionKind,
    pub count: usize,
}

/// Distinct terms containing `partial`, counted per kind, ordered by count
/// then alphabetically. Terms are grouped case-insensitively; the first
/// spelling seen is reported.
pub fn suggestions(items: &[CatalogItem], partial: &str, max: usize) -> Vec<Suggestion> {
    let needle = super::sanitize_query(partial).to_lowercase();
    if needle.is_empty() || max == 0 {
        return Vec::new();
    }

    let mut counts: HashMap<(SuggestionKind, String), Suggestion> = HashMap::new();
    let mut record = |kind: SuggestionKind, term: &str| {
        let term = term.trim();
        let folded = term.to_lowercase();
        if term.is_empty() || !folded.contains(&needle) {
            return;
        }
        counts
            .entry((kind, folded))
            .or_insert_with(|| Suggestion {
                term: term.to_string(),
                kind,
                count: 0,
            })
            .count += 1;
    };

    for item in items {
        record(SuggestionKind::Name, &item.name);
        record(SuggestionKind::Provider, &item.provider);
        record(SuggestionKind::Category, &item.category);
        for capability in &item.capabilities {
            record(SuggestionKind::Capability, capability);
        }
    }

    let mut ranked: Vec<Suggestion> = counts.into_values().collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.term.to_lowercase().cmp(&b.term.to_lowercase()))
            .then_with(|| a.kind.cmp(&b.kind))
    });
    ranked.truncate(max);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<CatalogItem> {
        vec![
            CatalogItem::new("1", "GPT-4", "OpenAI", "chat").with_capabilities(&["chat", "code"]),
            CatalogItem::new("2", "GPT-3.5", "openai", "chat").with_capabilities(&["chat"]),
            CatalogItem::new("3", "Claude-3", "Anthropic", "chat").with_capabilities(&["chat"]),
        ]
    }

    #[test]
    fn test_ordered_by_count_then_term() {
        let found = suggestions(&corpus(), "ch", 10);
        assert_eq!(found[0].count, 3);
        assert_eq!(found[0].term, "chat");
        assert_eq!(found[0].kind, SuggestionKind::Category);
        assert_eq!(found[1].kind, SuggestionKind::Capability);
        assert_eq!(found[1].count, 3);
    }

    #[test]
    fn test_groups_case_insensitively() {
        let found = suggestions(&corpus(), "openai", 10);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].term, "OpenAI");
        assert_eq!(found[0].count, 2);
    }

    #[test]
    fn test_max_and_empty() {
        assert_eq!(suggestions(&corpus(), "gpt", 1).len(), 1);
        assert!(suggestions(&corpus(), "", 5).is_empty());
        assert!(suggestions(&corpus(), "\u{7}", 5).is_empty());
    }
}
