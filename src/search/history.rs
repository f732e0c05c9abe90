use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub result_count: usize,
    pub searched_at: DateTime<Utc>,
}

/// Most-recent-first list of past queries, deduplicated case-insensitively.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Records a query at the front, replacing any earlier entry that differs
    /// only in case. Blank queries are ignored.
    pub fn track(&mut self, query: &str, result_count: usize) {
        self.track_at(query, result_count, Utc::now());
    }

    pub fn track_at(&mut self, query: &str, result_count: usize, searched_at: DateTime<Utc>) {
        let query = query.trim();
        if query.is_empty() || self.capacity == 0 {
            return;
        }
        let folded = query.to_lowercase();
        self.entries.retain(|e| e.query.to_lowercase() != folded);
        self.entries.insert(
            0,
            HistoryEntry {
                query: query.to_string(),
                result_count,
                searched_at,
            },
        );
        self.entries.truncate(self.capacity);
    }

    /// Replaces the contents, keeping the given order and enforcing the bound.
    pub fn replace(&mut self, entries: Vec<HistoryEntry>) {
        self.entries.clear();
        for entry in entries.into_iter().rev() {
            self.track_at(&entry.query, entry.result_count, entry.searched_at);
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(history: &SearchHistory) -> Vec<&str> {
        history.entries().iter().map(|e| e.query.as_str()).collect()
    }

    #[test]
    fn test_newest_first_and_deduplicated() {
        let mut history = SearchHistory::default();
        history.track("gpt", 2);
        history.track("claude", 1);
        history.track("GPT", 3);

        assert_eq!(queries(&history), vec!["GPT", "claude"]);
        assert_eq!(history.entries()[0].result_count, 3);
    }

    #[test]
    fn test_bounded() {
        let mut history = SearchHistory::new(3);
        for q in ["a1", "a2", "a3", "a4"] {
            history.track(q, 0);
        }
        assert_eq!(queries(&history), vec!["a4", "a3", "a2"]);
    }

    #[test]
    fn test_blank_queries_ignored() {
        let mut history = SearchHistory::default();
        history.track("   ", 0);
        assert!(history.is_empty());
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut source = SearchHistory::default();
        source.track("old", 1);
        source.track("new", 2);

        let mut restored = SearchHistory::new(5);
        restored.replace(source.entries().to_vec());
        assert_eq!(queries(&restored), vec!["new", "old"]);
    }
}
