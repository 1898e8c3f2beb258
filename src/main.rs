use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

mod cache;
mod config;
mod data;
mod error;
mod fetch;
mod graph;
mod service;
mod storage;

use config::TraversalConfig;
use fetch::FixtureFetcher;
use service::GraphService;

#[derive(Parser, Debug)]
#[clap(
    name = "follow-graph-analyzer",
    about = "Bounded BFS collection and analysis of a decentralized follow graph"
)]
struct Cli {
    /// Path to input JSON record file
    #[clap(long)]
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "graph_results")]
    output_dir: String,

    /// Seed identity; omit for global mode
    #[clap(long)]
    root: Option<String>,

    /// Number of BFS levels to traverse (1-4)
    #[clap(long, default_value = "2")]
    depth: u32,

    /// Hard cap on distinct nodes
    #[clap(long, default_value = "150")]
    limit: usize,

    /// Identity for distance labeling
    #[clap(long)]
    reference: Option<String>,

    /// Overall fetch budget in seconds
    #[clap(long, default_value = "12")]
    timeout: u64,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Starting follow-graph analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    let fetcher = FixtureFetcher::from_path(Path::new(&args.input))?;

    let config = TraversalConfig {
        root_pubkey: args.root,
        depth: args.depth,
        max_nodes: args.limit,
        reference_user: args.reference,
        ..TraversalConfig::default()
    };

    let service =
        GraphService::new(fetcher).with_fetch_budget(Duration::from_secs(args.timeout));
    let snapshot = service.snapshot(&config)?;

    log::info!(
        "Collected graph with {} nodes and {} edges",
        snapshot.stats.total_nodes,
        snapshot.stats.total_links
    );

    storage::save_results(&snapshot, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
