//! Flipbook Core (engine-agnostic frame animation)
//!
//! A clip is an ordered list of frames with a frame rate, a loop flag and
//! optional per-frame speed multipliers and trigger names. A
//! [`FrameAnimator`] moves a cursor through one clip as the host calls
//! `tick(dt)` and notifies observers of frame changes, triggers and clip
//! completion. An [`AnimatorGraph`] links animators into parent/child and
//! shared-peer hierarchies so that one play/pause/resume command keeps
//! several visual layers in step.
//!
//! Everything is single-threaded and poll-driven: no timers, no threads.
//! Rendering is left to the host through the traits in [`surface`].

pub mod animator;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod gate;
pub mod graph;
pub mod ids;
pub mod library;
pub mod outputs;
pub mod stored_clip;
pub mod surface;

// Re-exports for consumers (hosts and adapters)
pub use animator::{FrameAnimator, PlaybackState};
pub use config::{ChildMode, Config, NodeConfig};
pub use data::{same_clip, Clip, ClipRef, Frame, DEFAULT_FRAME_RATE};
pub use error::FlipbookError;
pub use events::{FrameEvent, Observers};
pub use gate::ClipGate;
pub use graph::{AnimatorGraph, Node, NodeKind};
pub use ids::{NodeId, ObserverId};
pub use library::ClipLibrary;
pub use outputs::{AnimatorEvent, Outputs};
pub use stored_clip::{parse_clip_catalog_json, parse_clip_library_json};
pub use surface::{
    Colorable, Flippable, FrameSurface, SortOrdered, SortingOrder, SurfaceSet, Visible,
};

/// flipbook-core result type
pub type Result<T> = core::result::Result<T, FlipbookError>;
