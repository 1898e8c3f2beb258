//! In-memory record source
//!
//! Backs the CLI (records loaded from a JSON file) and the test suite. The
//! fixture applies the same kind/author/limit filtering a relay-backed
//! fetcher would, so traversal logic sees the real interface contract.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::FetchError;
use crate::fetch::{CancelToken, ContactRecord, RecordFetcher, RecordFilter};

/// Record source backed by a fixed in-memory record set.
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    records: Vec<ContactRecord>,
}

impl FixtureFetcher {
    pub fn new(records: Vec<ContactRecord>) -> Self {
        Self { records }
    }

    /// Load a record set from a JSON file containing an array of records.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open record fixture {}", path.display()))?;
        let records: Vec<ContactRecord> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("invalid record fixture {}", path.display()))?;
        log::info!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    pub fn push(&mut self, record: ContactRecord) {
        self.records.push(record);
    }
}

impl RecordFetcher for FixtureFetcher {
    fn fetch_latest(
        &self,
        filter: &RecordFilter,
        cancel: &CancelToken,
    ) -> Result<Vec<ContactRecord>, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let author_set: Option<HashSet<&str>> = filter
            .authors
            .as_ref()
            .map(|authors| authors.iter().map(String::as_str).collect());

        let mut matches: Vec<ContactRecord> = self
            .records
            .iter()
            .filter(|r| r.kind == filter.kind)
            .filter(|r| match &author_set {
                Some(set) => set.contains(r.author.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        // Newest first, the order relays deliver limited queries in
        matches.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        if let Some(limit) = filter.limit {
            matches.truncate(limit);
        }

        Ok(matches)
    }
}
