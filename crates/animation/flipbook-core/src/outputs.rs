//! Output journal of an animator graph.
//!
//! Every notification a node fires is also appended here, tagged with the
//! node id and in firing order. Hosts that cannot react from inside an
//! observer callback drain this once per update instead.

use serde::{Deserialize, Serialize};

use crate::events::FrameEvent;
use crate::ids::NodeId;

/// One notification fired by one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorEvent {
    pub node: NodeId,
    pub event: FrameEvent,
}

/// Events accumulated since the last drain.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<AnimatorEvent>,
    /// Events discarded because the journal was full.
    #[serde(default)]
    pub dropped: usize,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    /// Append unless `capacity` is reached; returns false when dropped.
    #[inline]
    pub fn push_event(&mut self, node: NodeId, event: FrameEvent, capacity: usize) -> bool {
        if self.events.len() >= capacity {
            self.dropped += 1;
            return false;
        }
        self.events.push(AnimatorEvent { node, event });
        true
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.dropped == 0
    }

    /// Take all events and reset the drop counter.
    pub fn drain(&mut self) -> Outputs {
        std::mem::take(self)
    }

    pub fn for_node(&self, node: NodeId) -> impl Iterator<Item = &FrameEvent> {
        self.events
            .iter()
            .filter(move |e| e.node == node)
            .map(|e| &e.event)
    }

    pub fn triggers(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.events.iter().filter_map(|e| match &e.event {
            FrameEvent::Trigger { name } => Some((e.node, name.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_respects_capacity() {
        let mut out = Outputs::default();
        assert!(out.push_event(NodeId(0), FrameEvent::ClipComplete, 1));
        assert!(!out.push_event(NodeId(0), FrameEvent::ClipComplete, 1));
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.dropped, 1);

        let drained = out.drain();
        assert_eq!(drained.dropped, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn filters_by_node_and_kind() {
        let mut out = Outputs::default();
        out.push_event(NodeId(0), FrameEvent::FrameChanged { index: 3 }, 8);
        out.push_event(
            NodeId(1),
            FrameEvent::Trigger {
                name: "footstep".into(),
            },
            8,
        );
        assert_eq!(out.for_node(NodeId(0)).count(), 1);
        assert_eq!(out.triggers().collect::<Vec<_>>(), [(NodeId(1), "footstep")]);
    }
}
