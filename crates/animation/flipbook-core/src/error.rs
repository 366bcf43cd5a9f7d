//! Error types for flipbook-core

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Errors raised by the data model, the clip library and graph configuration.
///
/// Normal playback outcomes (unknown clip names, pausing an idle animator)
/// are not errors and never surface here.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FlipbookError {
    /// Frame lookup outside `[0, frame_count)`
    #[error("Frame {index} is out of range for a clip with {frame_count} frames")]
    FrameOutOfRange { index: usize, frame_count: usize },

    /// A clip without frames was handed to an animator
    #[error("Clip '{name}' has no frames and cannot be played")]
    EmptyClip { name: String },

    /// Clip data failed validation
    #[error("Invalid clip '{name}': {reason}")]
    InvalidClip { name: String, reason: String },

    /// Two clips with the same name were registered in one library
    #[error("Duplicate clip name: {name}")]
    DuplicateClipName { name: String },

    /// A node was listed as its own child or shared peer
    #[error("{node} cannot be registered as its own child or shared peer")]
    SelfReference { node: NodeId },

    /// Linking `from -> to` would make command fan-out recurse forever
    #[error("Linking {from} -> {to} would create a propagation cycle")]
    CycleDetected { from: NodeId, to: NodeId },

    /// Clip gates cannot forward commands
    #[error("{node} is a clip gate and cannot have children or shared peers")]
    LeafNode { node: NodeId },

    /// Node id does not refer to a live node
    #[error("Node not found: {node}")]
    NodeNotFound { node: NodeId },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl FlipbookError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::FrameOutOfRange { .. }
            | Self::EmptyClip { .. }
            | Self::InvalidClip { .. }
            | Self::DuplicateClipName { .. } => "data",
            Self::SelfReference { .. } | Self::CycleDetected { .. } | Self::LeafNode { .. } => {
                "configuration"
            }
            Self::NodeNotFound { .. } => "graph",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for FlipbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
