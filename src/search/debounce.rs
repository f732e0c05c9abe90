//! Debounced, generation-tagged search invocation
//!
//! Every call to [`DebouncedSearch::issue`] takes the next generation number.
//! A task commits its result only if no newer generation was issued while it
//! waited or ran; anything older is reported as superseded and dropped.
use crate::catalog::CatalogItem;
use crate::error::{Result, ScoutError};
use crate::metrics::Metrics;
use crate::search::{SearchEngine, SearchHit, SearchOptions};
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The newest result that was allowed to land
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedSearch {
    pub generation: u64,
    pub query: String,
    pub hits: Arc<Vec<SearchHit>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Committed(CommittedSearch),
    Superseded { generation: u64, latest: u64 },
}

/// Handle to one issued search
pub struct SearchHandle {
    generation: u64,
    task: JoinHandle<SearchOutcome>,
}

impl SearchHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Aborts the task; a cancelled handle never commits.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub async fn outcome(self) -> Result<SearchOutcome> {
        match self.task.await {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_cancelled() => Ok(SearchOutcome::Superseded {
                generation: self.generation,
                latest: self.generation,
            }),
            Err(e) => Err(ScoutError::Task(e.to_string())),
        }
    }
}

struct Shared {
    engine: Arc<SearchEngine>,
    snapshot: Mutex<Arc<Vec<CatalogItem>>>,
    generation: AtomicU64,
    committed: Mutex<Option<CommittedSearch>>,
    metrics: Arc<Metrics>,
}

/// Debounces rapid queries against a catalog snapshot. Must be used from
/// within a tokio runtime.
#[derive(Clone)]
pub struct DebouncedSearch {
    shared: Arc<Shared>,
    delay: Duration,
}

impl DebouncedSearch {
    pub fn new(
        engine: Arc<SearchEngine>,
        snapshot: Arc<Vec<CatalogItem>>,
        delay: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine,
                snapshot: Mutex::new(snapshot),
                generation: AtomicU64::new(0),
                committed: Mutex::new(None),
                metrics,
            }),
            delay,
        }
    }

    /// Swaps in a new snapshot for subsequently issued searches.
    pub fn replace_snapshot(&self, snapshot: Arc<Vec<CatalogItem>>) {
        *self.shared.snapshot.lock() = snapshot;
    }

    pub fn snapshot(&self) -> Arc<Vec<CatalogItem>> {
        self.shared.snapshot.lock().clone()
    }

    pub fn latest_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }

    pub fn committed(&self) -> Option<CommittedSearch> {
        self.shared.committed.lock().clone()
    }

    pub fn issue(&self, query: &str, options: SearchOptions) -> SearchHandle {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = self.shared.clone();
        let snapshot = self.snapshot();
        let delay = self.delay;
        let query = query.to_string();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(stale) = superseded(&shared, generation) {
                return stale;
            }

            let engine = shared.engine.clone();
            let search_query = query.clone();
            let hits = match tokio::task::spawn_blocking(move || {
                engine.search_hits(&snapshot, &search_query, &options)
            })
            .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    debug!("Search generation {generation} failed: {e}");
                    return SearchOutcome::Superseded {
                        generation,
                        latest: shared.generation.load(Ordering::SeqCst),
                    };
                }
            };

            let mut slot = shared.committed.lock();
            if let Some(stale) = superseded(&shared, generation) {
                return stale;
            }
            shared.engine.track_query(&query, hits.len());
            let committed = CommittedSearch {
                generation,
                query,
                hits,
            };
            *slot = Some(committed.clone());
            SearchOutcome::Committed(committed)
        });

        SearchHandle { generation, task }
    }
}

fn superseded(shared: &Shared, generation: u64) -> Option<SearchOutcome> {
    let latest = shared.generation.load(Ordering::SeqCst);
    if latest == generation {
        return None;
    }
    debug!("Discarding search generation {generation}; latest is {latest}");
    shared.metrics.stale_results.inc();
    Some(SearchOutcome::Superseded { generation, latest })
}
