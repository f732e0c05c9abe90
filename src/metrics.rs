use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub searches: IntCounter,
    pub search_cache_hits: IntCounter,
    pub sort_cache_hits: IntCounter,
    pub cache_misses: IntCounter,
    pub stale_results: IntCounter,
    pub recommendations_scored: IntCounter,
    registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn counter(name: &str, help: &str) -> IntCounter {
    IntCounter::with_opts(Opts::new(name, help)).expect("static metric options are valid")
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let searches = counter("searches_total", "Number of search evaluations");
        let search_cache_hits =
            counter("search_cache_hits_total", "Search results served from cache");
        let sort_cache_hits = counter("sort_cache_hits_total", "Sort orders served from cache");
        let cache_misses = counter("cache_misses_total", "Result cache lookups that missed");
        let stale_results = counter(
            "stale_results_total",
            "Debounced search completions discarded as superseded",
        );
        let recommendations_scored = counter(
            "recommendations_scored_total",
            "Number of candidate items scored for recommendations",
        );

        registry.register(Box::new(searches.clone())).ok();
        registry.register(Box::new(search_cache_hits.clone())).ok();
        registry.register(Box::new(sort_cache_hits.clone())).ok();
        registry.register(Box::new(cache_misses.clone())).ok();
        registry.register(Box::new(stale_results.clone())).ok();
        registry.register(Box::new(recommendations_scored.clone())).ok();

        Metrics {
            searches,
            search_cache_hits,
            sort_cache_hits,
            cache_misses,
            stale_results,
            recommendations_scored,
            registry: Arc::new(registry),
        }
    }

    pub fn gather(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_exposes_counters() {
        let metrics = Metrics::new();
        metrics.searches.inc();
        metrics.searches.inc();
        let text = metrics.gather();
        assert!(text.contains("searches_total 2"));
        assert!(text.contains("stale_results_total 0"));
    }
}
