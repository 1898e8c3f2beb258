//! Snapshot result cache
//!
//! Keyed by the full traversal parameter set; entries expire after a
//! freshness window and are then recomputed. A cached snapshot is never
//! mutated in place — every refresh stores a brand-new Arc.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::TraversalConfig;
use crate::graph::{GraphSnapshot, Identity};

/// Cache hits older than this trigger a fresh traversal.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(300);

/// Full parameter set identifying one traversal request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    root: Option<Identity>,
    depth: u32,
    max_nodes: usize,
    relays: Vec<String>,
    reference: Option<Identity>,
}

impl CacheKey {
    pub fn for_config(config: &TraversalConfig) -> Self {
        // Relay order is irrelevant to the result
        let mut relays = config.relay_urls.clone();
        relays.sort();
        Self {
            root: config.root_pubkey.clone(),
            depth: config.clamped_depth(),
            max_nodes: config.max_nodes,
            relays,
            reference: config.reference_user.clone(),
        }
    }
}

struct CachedSnapshot {
    snapshot: Arc<GraphSnapshot>,
    created: Instant,
}

/// Concurrent parameter-keyed snapshot cache with TTL freshness.
pub struct SnapshotCache {
    entries: DashMap<CacheKey, CachedSnapshot>,
    freshness: Duration,
}

impl SnapshotCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            freshness,
        }
    }

    /// Return the cached snapshot for `key` if it is still fresh.
    pub fn get_fresh(&self, key: &CacheKey) -> Option<Arc<GraphSnapshot>> {
        let entry = self.entries.get(key)?;
        if entry.created.elapsed() < self.freshness {
            Some(Arc::clone(&entry.snapshot))
        } else {
            None
        }
    }

    /// Store a freshly computed snapshot, superseding any prior entry.
    pub fn insert(&self, key: CacheKey, snapshot: Arc<GraphSnapshot>) {
        self.entries.insert(
            key,
            CachedSnapshot {
                snapshot,
                created: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}
