//! Cache-fronted traversal entry point
//!
//! The presentation layer asks for a snapshot per parameter set; fresh
//! cache hits are reused, anything else triggers a full collect + analytics
//! run producing a wholly new snapshot.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheKey, SnapshotCache};
use crate::config::TraversalConfig;
use crate::error::CollectError;
use crate::fetch::{CancelToken, RecordFetcher, DEFAULT_FETCH_BUDGET};
use crate::graph::{analytics, collector, GraphSnapshot};

pub struct GraphService<F> {
    fetcher: F,
    cache: SnapshotCache,
    fetch_budget: Duration,
}

impl<F: RecordFetcher> GraphService<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: SnapshotCache::default(),
            fetch_budget: DEFAULT_FETCH_BUDGET,
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.cache = SnapshotCache::new(freshness);
        self
    }

    pub fn with_fetch_budget(mut self, budget: Duration) -> Self {
        self.fetch_budget = budget;
        self
    }

    /// Snapshot for the given parameters, served from cache when fresh.
    pub fn snapshot(&self, config: &TraversalConfig) -> Result<Arc<GraphSnapshot>, CollectError> {
        let key = CacheKey::for_config(config);
        if let Some(hit) = self.cache.get_fresh(&key) {
            log::debug!("Serving cached snapshot");
            return Ok(hit);
        }
        let cancel = CancelToken::with_timeout(self.fetch_budget);
        self.refresh(config, &cancel)
    }

    /// Run a full traversal regardless of cache state. The result replaces
    /// any prior entry for the same parameters; a failed run replaces
    /// nothing.
    pub fn refresh(
        &self,
        config: &TraversalConfig,
        cancel: &CancelToken,
    ) -> Result<Arc<GraphSnapshot>, CollectError> {
        let mut graph = collector::collect(&self.fetcher, config, cancel)?;
        collector::enrich_profiles(&self.fetcher, config, &mut graph, cancel);
        let stats = analytics::analyze(&mut graph, config.reference_user.as_deref())?;

        let snapshot = Arc::new(graph.into_snapshot(stats));
        self.cache
            .insert(CacheKey::for_config(config), Arc::clone(&snapshot));
        Ok(snapshot)
    }
}
