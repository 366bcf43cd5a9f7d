//! Animator graph: nodes, their composition links and command fan-out.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Links are non-owning id
//! lists, so removing a node only unlinks it. Two kinds of links exist:
//!
//! - children receive play commands by clip *name* (or by instance when the
//!   child is configured with [`ChildMode::ShareClipsWithParent`]) and only
//!   when the parent has `animate_children` set;
//! - shared peers always receive the identical clip instance.
//!
//! `pause`/`resume` follow the same links without clip matching. Fan-out is a
//! synchronous depth-first walk; links that would form a cycle are rejected
//! when they are configured.

use log::{trace, warn};

use crate::animator::FrameAnimator;
use crate::config::{ChildMode, Config, NodeConfig};
use crate::data::ClipRef;
use crate::error::FlipbookError;
use crate::gate::ClipGate;
use crate::ids::{IdAllocator, NodeId};
use crate::library::ClipLibrary;
use crate::outputs::Outputs;
use crate::Result;

/// What a node does with commands it receives.
#[derive(Debug)]
pub enum NodeKind {
    Frames(FrameAnimator),
    Gate(ClipGate),
}

#[derive(Copy, Clone, Debug)]
enum LinkKind {
    Children,
    Shared,
}

/// One entry of the graph.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub config: NodeConfig,
    kind: NodeKind,
    children: Vec<NodeId>,
    shared: Vec<NodeId>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn shared(&self) -> &[NodeId] {
        &self.shared
    }

    pub fn is_playing(&self) -> bool {
        match &self.kind {
            NodeKind::Frames(anim) => anim.is_playing(),
            NodeKind::Gate(gate) => gate.is_playing(),
        }
    }

    pub fn current_clip(&self) -> Option<&ClipRef> {
        match &self.kind {
            NodeKind::Frames(anim) => anim.current_clip(),
            NodeKind::Gate(_) => None,
        }
    }

    fn links(&self, kind: LinkKind) -> &Vec<NodeId> {
        match kind {
            LinkKind::Children => &self.children,
            LinkKind::Shared => &self.shared,
        }
    }

    fn links_mut(&mut self, kind: LinkKind) -> &mut Vec<NodeId> {
        match kind {
            LinkKind::Children => &mut self.children,
            LinkKind::Shared => &mut self.shared,
        }
    }

    fn successors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().chain(self.shared.iter()).copied()
    }
}

/// Owner of every node and of the outputs journal.
#[derive(Debug)]
pub struct AnimatorGraph {
    cfg: Config,
    ids: IdAllocator,
    nodes: Vec<Option<Node>>,
    outputs: Outputs,
}

impl Default for AnimatorGraph {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AnimatorGraph {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            nodes: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Add a frame-animated node playing from `clips`.
    pub fn add_frame_node(
        &mut self,
        name: &str,
        clips: ClipLibrary,
        config: NodeConfig,
    ) -> NodeId {
        let next = self.nodes.len() as u64;
        let animator = match self.cfg.rng_seed {
            Some(seed) => FrameAnimator::with_seed(clips, seed.wrapping_add(next)),
            None => FrameAnimator::new(clips),
        };
        self.add_animator(name, animator, config)
    }

    /// Add a pre-built animator (observers may already be attached).
    pub fn add_animator(
        &mut self,
        name: &str,
        mut animator: FrameAnimator,
        config: NodeConfig,
    ) -> NodeId {
        animator.notifier_mut().set_journal(self.cfg.record_events);
        self.insert(name, NodeKind::Frames(animator), config)
    }

    pub fn add_gate(&mut self, name: &str, mut gate: ClipGate, config: NodeConfig) -> NodeId {
        gate.notifier_mut().set_journal(self.cfg.record_events);
        self.insert(name, NodeKind::Gate(gate), config)
    }

    fn insert(&mut self, name: &str, kind: NodeKind, config: NodeConfig) -> NodeId {
        let id = self.ids.alloc_node();
        debug_assert_eq!(id.index(), self.nodes.len());
        self.nodes.push(Some(Node {
            id,
            name: name.to_string(),
            config,
            kind,
            children: Vec::new(),
            shared: Vec::new(),
        }));
        id
    }

    /// Dispose a node and unlink it from every other node.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.collect_events(id);
        let mut node = self
            .nodes
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(FlipbookError::NodeNotFound { node: id })?;
        match &mut node.kind {
            NodeKind::Frames(anim) => anim.dispose(),
            NodeKind::Gate(gate) => gate.dispose(),
        }
        for other in self.nodes.iter_mut().flatten() {
            other.children.retain(|c| *c != id);
            other.shared.retain(|s| *s != id);
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    fn live(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(FlipbookError::NodeNotFound { node: id })
    }

    fn live_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(FlipbookError::NodeNotFound { node: id })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First live node with the given name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|n| n.name == name).map(|n| n.id)
    }

    pub fn animator(&self, id: NodeId) -> Option<&FrameAnimator> {
        match &self.node(id)?.kind {
            NodeKind::Frames(anim) => Some(anim),
            NodeKind::Gate(_) => None,
        }
    }

    pub fn animator_mut(&mut self, id: NodeId) -> Option<&mut FrameAnimator> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Frames(anim) => Some(anim),
            NodeKind::Gate(_) => None,
        }
    }

    pub fn gate(&self, id: NodeId) -> Option<&ClipGate> {
        match &self.node(id)?.kind {
            NodeKind::Gate(gate) => Some(gate),
            NodeKind::Frames(_) => None,
        }
    }

    pub fn gate_mut(&mut self, id: NodeId) -> Option<&mut ClipGate> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Gate(gate) => Some(gate),
            NodeKind::Frames(_) => None,
        }
    }

    pub fn is_playing(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_playing)
    }

    pub fn current_clip(&self, id: NodeId) -> Option<&ClipRef> {
        self.node(id)?.current_clip()
    }

    // ---------- configuration ----------

    /// Replace the children of `id`. Self references and cycles are rejected
    /// and leave the previous list in place.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) -> Result<()> {
        self.set_links(id, children, LinkKind::Children)
    }

    /// Replace the shared peers of `id`. Same checks as [`Self::set_children`].
    pub fn set_shared(&mut self, id: NodeId, shared: Vec<NodeId>) -> Result<()> {
        self.set_links(id, shared, LinkKind::Shared)
    }

    pub fn set_node_config(&mut self, id: NodeId, config: NodeConfig) -> Result<()> {
        self.live_mut(id)?.config = config;
        Ok(())
    }

    fn set_links(&mut self, id: NodeId, links: Vec<NodeId>, kind: LinkKind) -> Result<()> {
        let node = self.live(id)?;
        if matches!(node.kind, NodeKind::Gate(_)) && !links.is_empty() {
            return Err(FlipbookError::LeafNode { node: id });
        }
        let mut unique = Vec::with_capacity(links.len());
        for link in links {
            if link == id {
                return Err(FlipbookError::SelfReference { node: id });
            }
            self.live(link)?;
            if !unique.contains(&link) {
                unique.push(link);
            }
        }

        let previous = std::mem::replace(self.live_mut(id)?.links_mut(kind), unique);
        let offending = self
            .live(id)?
            .links(kind)
            .iter()
            .copied()
            .find(|&to| self.reaches(to, id));
        if let Some(to) = offending {
            *self.live_mut(id)?.links_mut(kind) = previous;
            return Err(FlipbookError::CycleDetected { from: id, to });
        }
        Ok(())
    }

    /// True when `target` is reachable from `from` over child and peer links.
    fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if std::mem::replace(&mut visited[id.index()], true) {
                continue;
            }
            if let Some(node) = self.node(id) {
                stack.extend(node.successors());
            }
        }
        false
    }

    /// Nodes a command issued at `root` reaches, depth-first, root first.
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut visited = vec![false; self.nodes.len()];
        self.walk(root, &mut visited, &mut out);
        out
    }

    fn walk(&self, id: NodeId, visited: &mut [bool], out: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if std::mem::replace(&mut visited[id.index()], true) {
            return;
        }
        out.push(id);
        if node.config.animate_children {
            for &child in &node.children {
                if self.child_mode(child) != Some(ChildMode::IgnoreParent) {
                    self.walk(child, visited, out);
                }
            }
        }
        for &peer in &node.shared {
            self.walk(peer, visited, out);
        }
    }

    fn child_mode(&self, id: NodeId) -> Option<ChildMode> {
        self.node(id).map(|n| n.config.child_mode)
    }

    // ---------- commands ----------

    /// Play `clip` on `id`, then relay it to children and shared peers.
    pub fn play_clip(&mut self, id: NodeId, clip: &ClipRef) -> Result<()> {
        self.live(id)?;
        self.play_clip_at(id, clip)
    }

    /// Play the clip named `name` from the library of `id`.
    /// Returns `Ok(false)` when `id` has no such clip; nothing is relayed then.
    pub fn play(&mut self, id: NodeId, name: &str) -> Result<bool> {
        self.live(id)?;
        self.play_named_at(id, name)
    }

    pub fn pause(&mut self, id: NodeId) -> Result<()> {
        self.live(id)?;
        self.fan_out(id, &|kind: &mut NodeKind| match kind {
            NodeKind::Frames(anim) => anim.pause(),
            NodeKind::Gate(gate) => gate.pause(),
        });
        Ok(())
    }

    pub fn resume(&mut self, id: NodeId) -> Result<()> {
        self.live(id)?;
        self.fan_out(id, &|kind: &mut NodeKind| match kind {
            NodeKind::Frames(anim) => anim.resume(),
            NodeKind::Gate(gate) => gate.resume(),
        });
        Ok(())
    }

    /// Advance one node. Nothing is relayed; every node is ticked on its own.
    pub fn tick(&mut self, id: NodeId, dt: f32) -> Result<()> {
        if let NodeKind::Frames(anim) = &mut self.live_mut(id)?.kind {
            anim.tick(dt);
        }
        self.collect_events(id);
        Ok(())
    }

    /// Advance every live node in id order and return the journal.
    pub fn tick_all(&mut self, dt: f32) -> &Outputs {
        for index in 0..self.nodes.len() {
            let id = NodeId(index as u32);
            if let Some(NodeKind::Frames(anim)) = self.node_mut(id).map(|n| &mut n.kind) {
                anim.tick(dt);
            }
            self.collect_events(id);
        }
        &self.outputs
    }

    /// Play the first clip of every idle autoplay node, in id order.
    /// A node that fails to start does not stop the others; the first
    /// failure is returned.
    pub fn start(&mut self) -> Result<()> {
        let mut first_err = None;
        for index in 0..self.nodes.len() {
            let id = NodeId(index as u32);
            let first = match self.node(id) {
                Some(node) if node.config.autoplay && !node.is_playing() => match &node.kind {
                    NodeKind::Frames(anim) => anim.clips().first().cloned(),
                    NodeKind::Gate(_) => None,
                },
                _ => None,
            };
            if let Some(clip) = first {
                let started = self.play_clip_at(id, &clip);
                keep_first(&mut first_err, id, started);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Take the journal accumulated since the previous drain.
    pub fn drain_outputs(&mut self) -> Outputs {
        self.outputs.drain()
    }

    // ---------- fan-out ----------

    /// Play `clip` on `id` and relay it. Relaying stops at nodes that
    /// already play that instance or fail to start it; siblings still
    /// receive the command. The first failure is returned.
    fn play_clip_at(&mut self, id: NodeId, clip: &ClipRef) -> Result<()> {
        let Some(node) = self.node_mut(id) else {
            return Ok(());
        };
        let started = match &mut node.kind {
            NodeKind::Frames(anim) => anim.play(clip),
            NodeKind::Gate(gate) => {
                gate.play(clip);
                Ok(true)
            }
        };
        let children = if node.config.animate_children {
            node.children.clone()
        } else {
            Vec::new()
        };
        let shared = node.shared.clone();
        self.collect_events(id);
        if !started? {
            return Ok(());
        }

        let mut first_err = None;
        for child in children {
            let relayed = match self.child_mode(child) {
                Some(ChildMode::PlayWithParent) => {
                    trace!("{id} -> child {child}: play '{}'", clip.name());
                    self.play_named_at(child, clip.name()).map(|_| ())
                }
                Some(ChildMode::ShareClipsWithParent) => {
                    trace!("{id} -> child {child}: share '{}'", clip.name());
                    self.play_clip_at(child, clip)
                }
                Some(ChildMode::IgnoreParent) | None => Ok(()),
            };
            keep_first(&mut first_err, child, relayed);
        }
        for peer in shared {
            trace!("{id} -> peer {peer}: share '{}'", clip.name());
            let relayed = self.play_clip_at(peer, clip);
            keep_first(&mut first_err, peer, relayed);
        }
        first_err.map_or(Ok(()), Err)
    }

    fn play_named_at(&mut self, id: NodeId, name: &str) -> Result<bool> {
        let Some(node) = self.node_mut(id) else {
            return Ok(false);
        };
        let clip = match &mut node.kind {
            NodeKind::Frames(anim) => anim.clips().get(name).cloned(),
            NodeKind::Gate(gate) => {
                let accepted = gate.play_named(name);
                self.collect_events(id);
                return Ok(accepted);
            }
        };
        match clip {
            Some(clip) => {
                self.play_clip_at(id, &clip)?;
                Ok(true)
            }
            None => {
                trace!("{id} has no clip named '{name}'");
                Ok(false)
            }
        }
    }

    fn fan_out(&mut self, id: NodeId, apply: &dyn Fn(&mut NodeKind)) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        apply(&mut node.kind);
        let children = if node.config.animate_children {
            node.children.clone()
        } else {
            Vec::new()
        };
        let shared = node.shared.clone();
        self.collect_events(id);

        for child in children {
            if self.child_mode(child) != Some(ChildMode::IgnoreParent) {
                self.fan_out(child, apply);
            }
        }
        for peer in shared {
            self.fan_out(peer, apply);
        }
    }

    /// Move journaled notifications of `id` into the graph outputs.
    fn collect_events(&mut self, id: NodeId) {
        let capacity = self.cfg.max_pending_events;
        let Some(node) = self.nodes.get_mut(id.index()).and_then(Option::as_mut) else {
            return;
        };
        let events = match &mut node.kind {
            NodeKind::Frames(anim) => anim.notifier_mut().drain_journal(),
            NodeKind::Gate(gate) => gate.notifier_mut().drain_journal(),
        };
        for event in events {
            if !self.outputs.push_event(id, event, capacity) && self.outputs.dropped == 1 {
                warn!("outputs journal full ({capacity} events); dropping until drained");
            }
        }
    }
}

/// Record `result` of a relayed command, keeping only the first failure.
fn keep_first(first: &mut Option<FlipbookError>, node: NodeId, result: Result<()>) {
    if let Err(err) = result {
        warn!("{node}: {err} ({})", err.category());
        first.get_or_insert(err);
    }
}
