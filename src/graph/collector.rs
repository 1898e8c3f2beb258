//! Bounded breadth-first collection of the follow graph
//!
//! Traversal is level-synchronous: every batch of level N completes, with
//! all of its node/edge mutations, before level N+1 is dequeued. The run
//! owns all of its traversal state; nothing is shared between concurrent
//! runs.

use std::collections::{HashMap, HashSet};
use std::mem;

use crate::config::TraversalConfig;
use crate::data::{contacts, profile};
use crate::error::CollectError;
use crate::fetch::{CancelToken, ContactRecord, RecordFetcher, RecordFilter};
use crate::graph::{FollowGraph, Identity};

/// Identities per fetch call, sized to relay-side query limits.
const FETCH_BATCH_SIZE: usize = 50;

/// Frontier bookkeeping owned by a single collection run.
struct TraversalState {
    graph: FollowGraph,
    processed: HashSet<Identity>,
    queued: HashSet<Identity>,
    frontier: Vec<Identity>,
    next: Vec<Identity>,
    level: u32,
}

impl TraversalState {
    fn new() -> Self {
        Self {
            graph: FollowGraph::new(),
            processed: HashSet::new(),
            queued: HashSet::new(),
            frontier: Vec::new(),
            next: Vec::new(),
            level: 0,
        }
    }

    fn seed(&mut self, id: &str) {
        self.queued.insert(id.to_string());
        self.frontier.push(id.to_string());
    }

    fn mark_frontier_processed(&mut self) {
        for id in self.frontier.drain(..) {
            self.processed.insert(id);
        }
    }
}

/// Collect a deduplicated follow graph by bounded BFS over the contact-list
/// records reachable from the configured seed.
///
/// Returns the full accumulator on success; any fetch failure or
/// cancellation is terminal and yields no partial graph.
pub fn collect<F: RecordFetcher + ?Sized>(
    fetcher: &F,
    config: &TraversalConfig,
    cancel: &CancelToken,
) -> Result<FollowGraph, CollectError> {
    let depth = config.clamped_depth();
    let mut state = TraversalState::new();

    match &config.root_pubkey {
        Some(root) => {
            // The root always appears, even with no edges at all
            state.graph.get_or_insert_node(root);
            state.seed(root);
        }
        None => seed_global(fetcher, config, cancel, &mut state)?,
    }

    while !state.frontier.is_empty() {
        if state.level >= depth {
            // Depth budget reached: mark as processed, never fetch
            log::debug!(
                "Skipping {} identities at level {}",
                state.frontier.len(),
                state.level
            );
            state.mark_frontier_processed();
        } else {
            log::debug!(
                "Traversing level {} with {} identities",
                state.level,
                state.frontier.len()
            );
            let frontier = mem::take(&mut state.frontier);
            for batch in frontier.chunks(FETCH_BATCH_SIZE) {
                process_batch(fetcher, config, cancel, &mut state, batch, depth)?;
            }
        }
        state.frontier = mem::take(&mut state.next);
        state.level += 1;
    }

    log::info!(
        "Collected {} nodes and {} edges in {} levels",
        state.graph.node_count(),
        state.graph.edge_count(),
        state.level
    );
    Ok(state.graph)
}

/// Seed the frontier in global mode from one unscoped query for recent
/// contact-list records. Zero results is a normal empty snapshot.
fn seed_global<F: RecordFetcher + ?Sized>(
    fetcher: &F,
    config: &TraversalConfig,
    cancel: &CancelToken,
    state: &mut TraversalState,
) -> Result<(), CollectError> {
    if cancel.is_cancelled() {
        return Err(CollectError::Cancelled);
    }

    let filter =
        RecordFilter::recent_contacts(config.global_seed_limit).scoped_to(&config.relay_urls);
    let records = fetcher.fetch_latest(&filter, cancel)?;

    for record in &records {
        if state.graph.contains(&record.author) {
            continue;
        }
        if state.graph.node_count() >= config.max_nodes {
            break;
        }
        state.graph.get_or_insert_node(&record.author);
        state.seed(&record.author);
    }

    log::info!("Seeded global mode with {} authors", state.frontier.len());
    Ok(())
}

/// Fetch and fold one same-level batch of identities into the graph.
fn process_batch<F: RecordFetcher + ?Sized>(
    fetcher: &F,
    config: &TraversalConfig,
    cancel: &CancelToken,
    state: &mut TraversalState,
    batch: &[Identity],
    depth: u32,
) -> Result<(), CollectError> {
    if cancel.is_cancelled() {
        return Err(CollectError::Cancelled);
    }

    let filter = RecordFilter::latest_contacts(batch.to_vec()).scoped_to(&config.relay_urls);
    let records = fetcher.fetch_latest(&filter, cancel)?;
    let latest = newest_per_author(records);

    for owner_id in batch {
        state.processed.insert(owner_id.clone());

        let Some(record) = latest.get(owner_id) else {
            continue;
        };
        let owner = state
            .graph
            .index_of(owner_id)
            .ok_or_else(|| CollectError::Integrity(format!("frontier identity {owner_id} has no node")))?;

        for followed in contacts::followed_identities(record) {
            match state.graph.index_of(&followed) {
                Some(target) => {
                    // Referenced again: bump weight, dedupe the edge
                    state.graph.bump_importance(target);
                    state.graph.insert_edge(owner, target);
                }
                None => {
                    if state.graph.node_count() >= config.max_nodes {
                        // Node budget exhausted: no node, no edge
                        continue;
                    }
                    let target = state.graph.get_or_insert_node(&followed);
                    state.graph.insert_edge(owner, target);

                    if state.level + 1 <= depth
                        && !state.processed.contains(&followed)
                        && state.queued.insert(followed.clone())
                    {
                        state.next.push(followed);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Keep only the newest record per author; older duplicates from other
/// relays or rounds are superseded.
fn newest_per_author(records: Vec<ContactRecord>) -> HashMap<Identity, ContactRecord> {
    let mut latest: HashMap<Identity, ContactRecord> = HashMap::new();
    for record in records {
        match latest.get(&record.author) {
            Some(existing) if existing.created_at >= record.created_at => {}
            _ => {
                latest.insert(record.author.clone(), record);
            }
        }
    }
    latest
}

/// Fill node labels from profile-metadata records, batched over every
/// collected node. Best-effort: a failed or cancelled fetch leaves the
/// remaining labels absent and never fails the run.
pub fn enrich_profiles<F: RecordFetcher + ?Sized>(
    fetcher: &F,
    config: &TraversalConfig,
    graph: &mut FollowGraph,
    cancel: &CancelToken,
) {
    let ids: Vec<Identity> = graph.nodes().iter().map(|n| n.id.clone()).collect();
    let mut labeled = 0usize;

    for batch in ids.chunks(FETCH_BATCH_SIZE) {
        if cancel.is_cancelled() {
            log::warn!("Profile enrichment cancelled; remaining labels left absent");
            return;
        }

        let filter = RecordFilter::metadata_for(batch.to_vec()).scoped_to(&config.relay_urls);
        let records = match fetcher.fetch_latest(&filter, cancel) {
            Ok(records) => records,
            Err(err) => {
                log::warn!("Profile fetch failed: {err}; remaining labels left absent");
                return;
            }
        };

        for (author, record) in newest_per_author(records) {
            let Some(parsed) = profile::parse_profile(&record) else {
                continue;
            };
            if let (Some(index), Some(name)) = (graph.index_of(&author), parsed.best_name()) {
                graph.set_label(index, name.to_string());
                labeled += 1;
            }
        }
    }

    log::info!("Labeled {} of {} nodes from profile metadata", labeled, ids.len());
}
