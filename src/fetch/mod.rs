//! Record fetching interface
//!
//! The engine never talks to relays directly; it consumes published records
//! through the [`RecordFetcher`] trait. The collector issues batched latest-
//! record queries and treats any fetch failure as terminal for the run.

pub mod fixture;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::graph::Identity;

pub use fixture::FixtureFetcher;

/// Overall deadline applied to a traversal run when the caller does not
/// supply one.
pub const DEFAULT_FETCH_BUDGET: Duration = Duration::from_secs(12);

/// Record kinds the engine queries, with their protocol kind numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Published contact list (kind 3)
    ContactList,
    /// Profile metadata with JSON content (kind 0)
    Metadata,
}

impl RecordKind {
    pub fn kind_number(self) -> u32 {
        match self {
            RecordKind::ContactList => 3,
            RecordKind::Metadata => 0,
        }
    }
}

/// One published record as delivered by a relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub author: Identity,
    pub kind: RecordKind,
    pub created_at: i64,

    /// (tag name, tag value) pairs; person references carry tag name "p"
    pub tags: Vec<(String, String)>,

    /// Raw content payload; JSON for metadata records
    pub content: String,
}

impl ContactRecord {
    /// Build a contact-list record referencing the given identities.
    /// Primarily useful for fixtures and tests.
    pub fn contact_list<I, S>(author: &str, created_at: i64, follows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            author: author.to_string(),
            kind: RecordKind::ContactList,
            created_at,
            tags: follows
                .into_iter()
                .map(|id| ("p".to_string(), id.into()))
                .collect(),
            content: String::new(),
        }
    }

    /// Build a metadata record with a raw JSON content payload.
    pub fn metadata(author: &str, created_at: i64, content: &str) -> Self {
        Self {
            author: author.to_string(),
            kind: RecordKind::Metadata,
            created_at,
            tags: Vec::new(),
            content: content.to_string(),
        }
    }
}

/// Query shape passed to a fetcher: which kind, optionally scoped to a set
/// of authors, capped at a result count, against a relay set (empty means
/// the fetcher's aggregated default set).
#[derive(Debug, Clone)]
pub struct RecordFilter {
    pub kind: RecordKind,
    pub authors: Option<Vec<Identity>>,
    pub limit: Option<usize>,
    pub relays: Vec<String>,
}

impl RecordFilter {
    pub fn latest_contacts(authors: Vec<Identity>) -> Self {
        Self {
            kind: RecordKind::ContactList,
            authors: Some(authors),
            limit: None,
            relays: Vec::new(),
        }
    }

    pub fn recent_contacts(limit: usize) -> Self {
        Self {
            kind: RecordKind::ContactList,
            authors: None,
            limit: Some(limit),
            relays: Vec::new(),
        }
    }

    pub fn metadata_for(authors: Vec<Identity>) -> Self {
        Self {
            kind: RecordKind::Metadata,
            authors: Some(authors),
            limit: None,
            relays: Vec::new(),
        }
    }

    pub fn scoped_to(mut self, relays: &[String]) -> Self {
        self.relays = relays.to_vec();
        self
    }
}

/// Combined cancellation signal: a caller-triggerable flag composed with a
/// fixed deadline. Cloning shares the flag, so a token handed to a
/// superseding request cancels every fetch issued under it.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Instant,
}

impl CancelToken {
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now() + budget,
        }
    }

    /// Signal cancellation to every holder of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || Instant::now() >= self.deadline
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_FETCH_BUDGET)
    }
}

/// Source of published records. Implementations decide relay selection,
/// retries, and transport; the engine only requires that returned records
/// match the filter and that the cancel token is honored.
pub trait RecordFetcher {
    /// Return the latest records matching `filter`. May return several
    /// records per author (one per relay); the caller keeps the newest.
    fn fetch_latest(
        &self,
        filter: &RecordFilter,
        cancel: &CancelToken,
    ) -> Result<Vec<ContactRecord>, FetchError>;
}
