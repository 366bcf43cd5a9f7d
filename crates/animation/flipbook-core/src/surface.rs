//! Capability traits for rendering surfaces driven by an animator graph.
//!
//! The animators never touch these. A host keeps one surface per node
//! (sprite renderer, UI image, particle emitter, transform) in a
//! [`SurfaceSet`] and feeds it the graph outputs. Each surface type
//! implements only the capabilities it actually has.

use indexmap::IndexMap;

use crate::events::FrameEvent;
use crate::graph::AnimatorGraph;
use crate::ids::NodeId;
use crate::outputs::Outputs;

/// Shows the visual asset for a frame index.
pub trait FrameSurface {
    fn show_frame(&mut self, index: usize);
}

pub trait Flippable {
    fn is_flipped(&self) -> bool;
    fn set_flipped(&mut self, flipped: bool);
}

pub trait SortOrdered {
    fn sorting_order(&self) -> i32;
    fn set_sorting_order(&mut self, order: i32);
}

pub trait Colorable {
    fn set_color(&mut self, rgba: [f32; 4]);
}

pub trait Visible {
    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
}

/// Sorting order that keeps the offset a surface was authored with.
/// Setting `value` yields `value + base`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SortingOrder {
    base: i32,
    current: i32,
}

impl SortingOrder {
    pub fn new(base: i32) -> Self {
        Self {
            base,
            current: base,
        }
    }

    #[inline]
    pub fn get(&self) -> i32 {
        self.current
    }

    pub fn set(&mut self, value: i32) {
        self.current = value.saturating_add(self.base);
    }
}

/// Surfaces keyed by the node that drives them.
#[derive(Debug)]
pub struct SurfaceSet<S> {
    surfaces: IndexMap<NodeId, S>,
}

impl<S> Default for SurfaceSet<S> {
    fn default() -> Self {
        Self {
            surfaces: IndexMap::new(),
        }
    }
}

impl<S> SurfaceSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `surface` to `node`, returning the previous one.
    pub fn insert(&mut self, node: NodeId, surface: S) -> Option<S> {
        self.surfaces.insert(node, surface)
    }

    pub fn remove(&mut self, node: NodeId) -> Option<S> {
        self.surfaces.shift_remove(&node)
    }

    pub fn get(&self, node: NodeId) -> Option<&S> {
        self.surfaces.get(&node)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut S> {
        self.surfaces.get_mut(&node)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    fn for_subtree(&mut self, graph: &AnimatorGraph, root: NodeId, mut f: impl FnMut(&mut S)) {
        for id in graph.subtree(root) {
            if let Some(surface) = self.surfaces.get_mut(&id) {
                f(surface);
            }
        }
    }
}

impl<S: FrameSurface> SurfaceSet<S> {
    /// Show every frame change in `outputs`, in order. Returns how many were applied.
    pub fn apply_frame_events(&mut self, outputs: &Outputs) -> usize {
        let mut applied = 0;
        for ev in &outputs.events {
            if let FrameEvent::FrameChanged { index } = ev.event {
                if let Some(surface) = self.surfaces.get_mut(&ev.node) {
                    surface.show_frame(index);
                    applied += 1;
                }
            }
        }
        applied
    }
}

impl<S: Visible> SurfaceSet<S> {
    /// Mirror clip-gate activity onto visibility.
    pub fn sync_gate_visibility(&mut self, outputs: &Outputs) {
        for ev in &outputs.events {
            if let FrameEvent::ActiveChanged { active } = ev.event {
                if let Some(surface) = self.surfaces.get_mut(&ev.node) {
                    surface.set_visible(active);
                }
            }
        }
    }
}

impl<S: Flippable> SurfaceSet<S> {
    /// Flip `root` and everything a command at `root` reaches.
    pub fn flip(&mut self, graph: &AnimatorGraph, root: NodeId, flipped: bool) {
        self.for_subtree(graph, root, |s| s.set_flipped(flipped));
    }
}

impl<S: SortOrdered> SurfaceSet<S> {
    /// Pass `order` down the subtree; each surface applies its own offset.
    pub fn set_sorting_order(&mut self, graph: &AnimatorGraph, root: NodeId, order: i32) {
        self.for_subtree(graph, root, |s| s.set_sorting_order(order));
    }
}

impl<S: Colorable> SurfaceSet<S> {
    pub fn set_color(&mut self, graph: &AnimatorGraph, root: NodeId, rgba: [f32; 4]) {
        self.for_subtree(graph, root, |s| s.set_color(rgba));
    }
}
