//! Traversal configuration

use crate::graph::Identity;

/// Traversal depth must stay within this inclusive range.
pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 4;

/// Relay endpoints queried when the caller does not name any.
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://nos.lol",
    "wss://relay.nostr.band",
    "wss://relay.snort.social",
];

/// Number of recent records used to seed the frontier in global mode.
pub const DEFAULT_GLOBAL_SEED_LIMIT: usize = 50;

/// Parameters of one traversal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalConfig {
    /// Seed identity; absent triggers global mode
    pub root_pubkey: Option<Identity>,

    /// Number of BFS levels to traverse, clamped to [1, 4]
    pub depth: u32,

    /// Hard cap on distinct nodes in the snapshot
    pub max_nodes: usize,

    /// Relay endpoints to query
    pub relay_urls: Vec<String>,

    /// Optional identity for distance labeling
    pub reference_user: Option<Identity>,

    /// Result cap for the global-mode seeding query
    pub global_seed_limit: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            root_pubkey: None,
            depth: 2,
            max_nodes: 150,
            relay_urls: DEFAULT_RELAYS.iter().map(|s| s.to_string()).collect(),
            reference_user: None,
            global_seed_limit: DEFAULT_GLOBAL_SEED_LIMIT,
        }
    }
}

impl TraversalConfig {
    /// Rooted traversal with default budgets and relays.
    pub fn rooted(root: &str) -> Self {
        Self {
            root_pubkey: Some(root.to_string()),
            ..Self::default()
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference_user = Some(reference.to_string());
        self
    }

    /// Depth with the [1, 4] bound applied.
    pub fn clamped_depth(&self) -> u32 {
        self.depth.clamp(MIN_DEPTH, MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_is_clamped_to_supported_range() {
        assert_eq!(TraversalConfig::default().with_depth(0).clamped_depth(), 1);
        assert_eq!(TraversalConfig::default().with_depth(3).clamped_depth(), 3);
        assert_eq!(TraversalConfig::default().with_depth(99).clamped_depth(), 4);
    }

    #[test]
    fn defaults_carry_the_reference_relay_set() {
        let config = TraversalConfig::default();
        assert_eq!(config.relay_urls.len(), DEFAULT_RELAYS.len());
        assert!(config.root_pubkey.is_none());
    }
}
