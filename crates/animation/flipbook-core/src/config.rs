//! Graph-wide and per-node configuration.

use serde::{Deserialize, Serialize};

/// Configuration for an [`crate::graph::AnimatorGraph`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Append every node notification to the graph's outputs journal.
    pub record_events: bool,

    /// Journal capacity between two drains; later events are dropped and counted.
    pub max_pending_events: usize,

    /// Seed for random-start selection. `None` seeds every node from entropy;
    /// `Some(s)` seeds node `i` with `s + i`.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_events: true,
            max_pending_events: 1024,
            rng_seed: None,
        }
    }
}

/// How a node reacts to commands when it sits in a parent's children list.
/// Shared-peer fan-out does not consult this.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChildMode {
    /// Receive the parent's clip by name from the local library.
    #[default]
    PlayWithParent,
    /// Receive the parent's clip instance directly.
    ShareClipsWithParent,
    /// Receive no commands from the parent.
    IgnoreParent,
}

/// Per-node configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodeConfig {
    /// Propagate play/pause/resume to children.
    pub animate_children: bool,
    pub child_mode: ChildMode,
    /// Play the first library clip on `AnimatorGraph::start` if idle.
    pub autoplay: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            animate_children: true,
            child_mode: ChildMode::PlayWithParent,
            autoplay: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_config_defaults_from_partial_json() {
        let cfg: NodeConfig = serde_json::from_str(r#"{ "child_mode": "IgnoreParent" }"#).unwrap();
        assert!(cfg.animate_children);
        assert!(cfg.autoplay);
        assert_eq!(cfg.child_mode, ChildMode::IgnoreParent);
    }

    #[test]
    fn config_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert!(cfg.record_events);
        assert_eq!(cfg.max_pending_events, 1024);
        assert_eq!(cfg.rng_seed, None);
    }
}
