//! Core library functions for the follow-graph analyzer

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod service;
pub mod storage;

pub use config::TraversalConfig;
pub use error::{CollectError, FetchError};
pub use fetch::{CancelToken, ContactRecord, FixtureFetcher, RecordFetcher, RecordFilter, RecordKind};
pub use graph::{Edge, FollowGraph, GraphSnapshot, GraphStats, Identity, Node};
pub use service::GraphService;
