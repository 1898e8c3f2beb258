//! Error taxonomy for collection runs

use thiserror::Error;

/// Failures surfaced by a [`RecordFetcher`](crate::fetch::RecordFetcher)
/// implementation. Any of these is terminal for the traversal that issued
/// the fetch; retry policy belongs to the fetcher, not the collector.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("relay request failed: {0}")]
    Relay(String),

    #[error("fetch timed out")]
    Timeout,

    #[error("fetch cancelled")]
    Cancelled,
}

/// Terminal failure of one collection run. No partial graph accompanies any
/// of these; the run either completes with a full snapshot or returns here.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("traversal cancelled")]
    Cancelled,

    /// An edge endpoint was missing from the node set. Unreachable when the
    /// accumulator invariants hold; kept as a checked error rather than a
    /// panic path.
    #[error("graph integrity violation: {0}")]
    Integrity(String),
}
