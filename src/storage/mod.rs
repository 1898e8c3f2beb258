//! Results persistence module

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty};

use crate::graph::GraphSnapshot;

/// Save one analyzed snapshot to the specified directory.
pub fn save_results(snapshot: &GraphSnapshot, output_dir: &str) -> Result<()> {
    log::info!(
        "Saving snapshot with {} nodes to {}",
        snapshot.stats.total_nodes,
        output_dir
    );

    fs::create_dir_all(output_dir)?;

    save_snapshot(snapshot, output_dir)?;
    save_summary(snapshot, output_dir)?;
    save_clusters(snapshot, output_dir)?;

    log::info!("Results saved successfully");
    Ok(())
}

/// Full node/edge/stats snapshot as consumed by the presentation layer.
fn save_snapshot(snapshot: &GraphSnapshot, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join("snapshot.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(snapshot)?.as_bytes())?;
    Ok(())
}

/// Aggregate statistics plus the hub list.
fn save_summary(snapshot: &GraphSnapshot, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let hubs: Vec<&str> = snapshot
        .nodes
        .iter()
        .filter(|n| n.is_hub)
        .map(|n| n.id.as_str())
        .collect();

    let avg_degree = if snapshot.nodes.is_empty() {
        0.0
    } else {
        snapshot
            .nodes
            .iter()
            .map(|n| n.total_degree() as f64)
            .sum::<f64>()
            / snapshot.nodes.len() as f64
    };

    let summary = json!({
        "stats": snapshot.stats,
        "avg_degree": avg_degree,
        "hubs": hubs,
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;
    Ok(())
}

/// Cluster membership grouped by label.
fn save_clusters(snapshot: &GraphSnapshot, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join("clusters.json");
    let mut file = File::create(path)?;

    let mut members: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for node in &snapshot.nodes {
        if let Some(cluster) = node.cluster {
            members.entry(cluster).or_default().push(node.id.as_str());
        }
    }

    let clusters = json!({
        "clusters": members.iter().map(|(id, ids)| {
            json!({
                "id": id,
                "size": ids.len(),
                "members": ids,
            })
        }).collect::<Vec<_>>()
    });

    file.write_all(to_string_pretty(&clusters)?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::analytics::analyze;
    use crate::graph::FollowGraph;

    #[test]
    fn writes_all_result_files() {
        let mut graph = FollowGraph::new();
        let a = graph.get_or_insert_node("a");
        let b = graph.get_or_insert_node("b");
        graph.insert_edge(a, b);
        let stats = analyze(&mut graph, None).unwrap();
        let snapshot = graph.into_snapshot(stats);

        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        save_results(&snapshot, dir_str).unwrap();

        for name in ["snapshot.json", "summary.json", "clusters.json"] {
            let contents = fs::read_to_string(dir.path().join(name)).unwrap();
            assert!(serde_json::from_str::<serde_json::Value>(&contents).is_ok());
        }
    }

    #[test]
    fn snapshot_json_uses_camel_case_fields() {
        let mut graph = FollowGraph::new();
        graph.get_or_insert_node("a");
        let stats = analyze(&mut graph, None).unwrap();
        let snapshot = graph.into_snapshot(stats);

        let dir = tempfile::tempdir().unwrap();
        save_results(&snapshot, dir.path().to_str().unwrap()).unwrap();

        let raw = fs::read_to_string(dir.path().join("snapshot.json")).unwrap();
        assert!(raw.contains("totalNodes"));
        assert!(raw.contains("inDegree"));
    }
}
