//! Post-collection graph analytics
//!
//! Runs once over the final node/edge accumulator, purely in memory:
//! degrees, bidirectionality, hub classification, approximate clustering,
//! and optional reference-distance labeling.

use std::collections::VecDeque;

use crate::error::CollectError;
use crate::graph::{FollowGraph, GraphStats};

/// Absolute degree floor for hub classification; keeps small graphs from
/// classifying everything as a hub.
const HUB_DEGREE_FLOOR: u32 = 10;

/// Undirected hop cap for the clustering BFS. Intentionally approximate:
/// nodes beyond 2 hops from a cluster seed start their own cluster on a
/// later outer iteration.
const CLUSTER_HOP_CAP: u32 = 2;

/// Run the full analytics pass and return the aggregate stats.
///
/// Mutates nodes and edges in place; the caller freezes the graph into a
/// snapshot afterwards.
pub fn analyze(
    graph: &mut FollowGraph,
    reference: Option<&str>,
) -> Result<GraphStats, CollectError> {
    let endpoints = edge_endpoints(graph)?;

    compute_degrees(graph, &endpoints);
    let bidirectional_links = mark_bidirectional(graph, &endpoints);
    let hub_count = classify_hubs(graph);

    let adjacency = undirected_adjacency(graph.node_count(), &endpoints);
    let cluster_count = assign_clusters(graph, &adjacency);

    if let Some(reference) = reference {
        label_distances(graph, &adjacency, reference);
    }

    let stats = GraphStats {
        total_nodes: graph.node_count(),
        total_links: graph.edge_count(),
        hub_count,
        bidirectional_links,
        cluster_count,
    };
    log::info!(
        "Analytics: {} nodes, {} links, {} hubs, {} bidirectional, {} clusters",
        stats.total_nodes,
        stats.total_links,
        stats.hub_count,
        stats.bidirectional_links,
        stats.cluster_count
    );
    Ok(stats)
}

/// Resolve every edge to its (source, target) index pair. A missing
/// endpoint cannot occur when the accumulator invariants hold.
fn edge_endpoints(graph: &FollowGraph) -> Result<Vec<(u32, u32)>, CollectError> {
    graph
        .edges()
        .iter()
        .map(|edge| {
            let source = graph.index_of(&edge.source).ok_or_else(|| {
                CollectError::Integrity(format!("edge source {} has no node", edge.source))
            })?;
            let target = graph.index_of(&edge.target).ok_or_else(|| {
                CollectError::Integrity(format!("edge target {} has no node", edge.target))
            })?;
            Ok((source, target))
        })
        .collect()
}

fn compute_degrees(graph: &mut FollowGraph, endpoints: &[(u32, u32)]) {
    for index in 0..graph.node_count() as u32 {
        let node = graph.node_mut(index);
        node.in_degree = 0;
        node.out_degree = 0;
    }
    for &(source, target) in endpoints {
        graph.node_mut(source).out_degree += 1;
        graph.node_mut(target).in_degree += 1;
    }
}

/// Mark every edge whose reverse also exists. Returns the number of edge
/// records marked; a mutual pair contributes 2. A self-loop is its own
/// reverse and qualifies.
fn mark_bidirectional(graph: &mut FollowGraph, endpoints: &[(u32, u32)]) -> usize {
    let mut marked = 0;
    for (edge_index, &(source, target)) in endpoints.iter().enumerate() {
        if graph.has_edge(target, source) {
            graph.mark_bidirectional(edge_index);
            marked += 1;
        }
    }
    marked
}

/// Classify hubs against twice the mean total degree (with an absolute
/// floor) and recompute visual importance. Importance only ever rises.
fn classify_hubs(graph: &mut FollowGraph) -> usize {
    let node_count = graph.node_count();
    let degree_sum: u64 = graph.nodes().iter().map(|n| n.total_degree() as u64).sum();
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degree_sum as f64 / node_count as f64
    };

    let mut hub_count = 0;
    for index in 0..node_count as u32 {
        let total = graph.node(index).total_degree();
        let is_hub = total as f64 >= 2.0 * avg_degree && total >= HUB_DEGREE_FLOOR;
        graph.node_mut(index).is_hub = is_hub;

        let floor = if is_hub {
            hub_count += 1;
            15 + (total / 5).min(15)
        } else {
            3 + (total / 2).min(7)
        };
        graph.raise_importance(index, floor);
    }
    hub_count
}

/// Undirected adjacency lists over the directed edge set. Mutual pairs
/// yield duplicate neighbors, which the visited checks absorb.
fn undirected_adjacency(node_count: usize, endpoints: &[(u32, u32)]) -> Vec<Vec<u32>> {
    let mut adjacency = vec![Vec::new(); node_count];
    for &(source, target) in endpoints {
        adjacency[source as usize].push(target);
        adjacency[target as usize].push(source);
    }
    adjacency
}

/// Label every node with a community id via hop-capped undirected BFS from
/// each yet-unlabeled node, in node insertion order. Ids are assigned from
/// a monotone counter starting at 0 and never reused within a pass.
fn assign_clusters(graph: &mut FollowGraph, adjacency: &[Vec<u32>]) -> usize {
    let mut next_id = 0u32;

    for seed in 0..graph.node_count() as u32 {
        if graph.node(seed).cluster.is_some() {
            continue;
        }
        let id = next_id;
        next_id += 1;
        graph.node_mut(seed).cluster = Some(id);

        let mut queue = VecDeque::from([(seed, 0u32)]);
        while let Some((index, hops)) = queue.pop_front() {
            if hops >= CLUSTER_HOP_CAP {
                continue;
            }
            for &neighbor in &adjacency[index as usize] {
                if graph.node(neighbor).cluster.is_none() {
                    graph.node_mut(neighbor).cluster = Some(id);
                    queue.push_back((neighbor, hops + 1));
                }
            }
        }
    }

    next_id as usize
}

/// Unweighted BFS hop counts from the reference identity over undirected
/// adjacency. Unreachable nodes keep no distance; the reference itself
/// gets 0. A reference absent from the node set labels nothing.
fn label_distances(graph: &mut FollowGraph, adjacency: &[Vec<u32>], reference: &str) {
    let Some(start) = graph.index_of(reference) else {
        log::debug!("Reference identity not present in snapshot; no distances assigned");
        return;
    };

    let mut distances: Vec<Option<u32>> = vec![None; graph.node_count()];
    distances[start as usize] = Some(0);

    let mut queue = VecDeque::from([start]);
    while let Some(index) = queue.pop_front() {
        let here = distances[index as usize].unwrap_or(0);
        for &neighbor in &adjacency[index as usize] {
            if distances[neighbor as usize].is_none() {
                distances[neighbor as usize] = Some(here + 1);
                queue.push_back(neighbor);
            }
        }
    }

    for (index, distance) in distances.into_iter().enumerate() {
        graph.node_mut(index as u32).distance_from_reference = distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MAX_IMPORTANCE, MIN_IMPORTANCE};

    /// Build a graph from directed id pairs, inserting nodes on first use.
    fn graph_of(edges: &[(&str, &str)]) -> FollowGraph {
        let mut graph = FollowGraph::new();
        for &(source, target) in edges {
            let s = graph.get_or_insert_node(source);
            let t = graph.get_or_insert_node(target);
            graph.insert_edge(s, t);
        }
        graph
    }

    fn node<'a>(graph: &'a FollowGraph, id: &str) -> &'a crate::graph::Node {
        graph.node(graph.index_of(id).unwrap())
    }

    #[test]
    fn degrees_follow_edge_directions() {
        let mut graph = graph_of(&[("a", "b"), ("a", "c"), ("b", "c")]);
        analyze(&mut graph, None).unwrap();

        assert_eq!(node(&graph, "a").out_degree, 2);
        assert_eq!(node(&graph, "a").in_degree, 0);
        assert_eq!(node(&graph, "c").in_degree, 2);
        assert_eq!(node(&graph, "c").out_degree, 0);
    }

    #[test]
    fn mutual_pair_marks_both_directions() {
        let mut graph = graph_of(&[("A", "B"), ("B", "A")]);
        let stats = analyze(&mut graph, None).unwrap();

        assert!(graph.edges().iter().all(|e| e.is_bidirectional));
        assert_eq!(stats.bidirectional_links, 2);
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.total_links, 2);
    }

    #[test]
    fn one_way_edges_stay_unidirectional() {
        let mut graph = graph_of(&[("a", "b"), ("b", "c")]);
        let stats = analyze(&mut graph, None).unwrap();

        assert!(graph.edges().iter().all(|e| !e.is_bidirectional));
        assert_eq!(stats.bidirectional_links, 0);
    }

    #[test]
    fn self_loop_is_its_own_reverse() {
        let mut graph = graph_of(&[("a", "a")]);
        let stats = analyze(&mut graph, None).unwrap();

        assert!(graph.edges()[0].is_bidirectional);
        assert_eq!(stats.bidirectional_links, 1);
    }

    #[test]
    fn hub_needs_both_relative_and_absolute_degree() {
        // Star with 12 spokes: center degree 12, average well below 6
        let edges: Vec<(String, String)> =
            (0..12).map(|i| (format!("s{i}"), "center".to_string())).collect();
        let borrowed: Vec<(&str, &str)> =
            edges.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let mut graph = graph_of(&borrowed);
        let stats = analyze(&mut graph, None).unwrap();

        assert!(node(&graph, "center").is_hub);
        assert_eq!(stats.hub_count, 1);
        // 15 + min(12 / 5, 15)
        assert_eq!(node(&graph, "center").importance, 17);
        assert!(!node(&graph, "s0").is_hub);
    }

    #[test]
    fn small_dense_graph_has_no_hubs() {
        // Triangle: every node doubles the average but misses the floor
        let mut graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let stats = analyze(&mut graph, None).unwrap();

        assert_eq!(stats.hub_count, 0);
        assert!(graph.nodes().iter().all(|n| !n.is_hub));
    }

    #[test]
    fn importance_stays_within_bounds_for_huge_hubs() {
        let edges: Vec<(String, String)> =
            (0..30).map(|i| (format!("s{i}"), "center".to_string())).collect();
        let borrowed: Vec<(&str, &str)> =
            edges.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let mut graph = graph_of(&borrowed);
        analyze(&mut graph, None).unwrap();

        // 15 + min(30 / 5, 15) = 21, clamped to the cap
        assert_eq!(node(&graph, "center").importance, MAX_IMPORTANCE);
        assert!(graph
            .nodes()
            .iter()
            .all(|n| (MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&n.importance)));
    }

    #[test]
    fn non_hub_importance_follows_degree_formula() {
        // b sits between two mutual pairs: total degree 4
        let mut graph = graph_of(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")]);
        analyze(&mut graph, None).unwrap();

        // 3 + min(4 / 2, 7)
        assert_eq!(node(&graph, "b").importance, 5);
    }

    #[test]
    fn every_node_gets_exactly_one_cluster() {
        let mut graph = graph_of(&[("a", "b"), ("c", "d"), ("e", "e")]);
        let stats = analyze(&mut graph, None).unwrap();

        assert!(graph.nodes().iter().all(|n| n.cluster.is_some()));
        assert_eq!(stats.cluster_count, 3);
    }

    #[test]
    fn cluster_bfs_is_capped_at_two_hops() {
        // Undirected 6-chain: the first sweep reaches a..c, the rest seed
        // a second cluster
        let mut graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "f")]);
        let stats = analyze(&mut graph, None).unwrap();

        assert_eq!(node(&graph, "a").cluster, Some(0));
        assert_eq!(node(&graph, "b").cluster, Some(0));
        assert_eq!(node(&graph, "c").cluster, Some(0));
        assert_eq!(node(&graph, "d").cluster, Some(1));
        assert_eq!(node(&graph, "e").cluster, Some(1));
        assert_eq!(node(&graph, "f").cluster, Some(1));
        assert_eq!(stats.cluster_count, 2);
    }

    #[test]
    fn distances_follow_undirected_hops() {
        let mut graph = graph_of(&[("a", "b"), ("c", "b"), ("d", "e")]);
        analyze(&mut graph, Some("a")).unwrap();

        assert_eq!(node(&graph, "a").distance_from_reference, Some(0));
        assert_eq!(node(&graph, "b").distance_from_reference, Some(1));
        // c follows b, reachable against edge direction
        assert_eq!(node(&graph, "c").distance_from_reference, Some(2));
        assert_eq!(node(&graph, "d").distance_from_reference, None);
        assert_eq!(node(&graph, "e").distance_from_reference, None);
    }

    #[test]
    fn isolated_reference_reaches_only_itself() {
        let mut graph = graph_of(&[("a", "b")]);
        graph.get_or_insert_node("z");
        analyze(&mut graph, Some("z")).unwrap();

        assert_eq!(node(&graph, "z").distance_from_reference, Some(0));
        assert_eq!(node(&graph, "a").distance_from_reference, None);
        assert_eq!(node(&graph, "b").distance_from_reference, None);
    }

    #[test]
    fn absent_reference_labels_nothing() {
        let mut graph = graph_of(&[("a", "b")]);
        analyze(&mut graph, Some("missing")).unwrap();

        assert!(graph
            .nodes()
            .iter()
            .all(|n| n.distance_from_reference.is_none()));
    }

    #[test]
    fn no_reference_leaves_distances_absent() {
        let mut graph = graph_of(&[("a", "b")]);
        analyze(&mut graph, None).unwrap();

        assert!(graph
            .nodes()
            .iter()
            .all(|n| n.distance_from_reference.is_none()));
    }

    #[test]
    fn empty_graph_yields_zeroed_stats() {
        let mut graph = FollowGraph::new();
        let stats = analyze(&mut graph, None).unwrap();
        assert_eq!(stats, GraphStats::default());
    }
}
