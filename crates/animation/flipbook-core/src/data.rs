//! Clip and frame data model.
//!
//! Both types are immutable once built. Clips are shared between animators as
//! [`ClipRef`] (an `Arc<Clip>`); pointer identity of that `Arc` is what the
//! animator compares when deciding whether a clip is "already playing".

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FlipbookError;
use crate::stored_clip::{StoredClip, StoredFrame};
use crate::Result;

/// Shared handle to an immutable clip.
pub type ClipRef = Arc<Clip>;

/// Default playback rate of a clip in frames per second.
pub const DEFAULT_FRAME_RATE: f32 = 8.0;

/// One step of a clip.
///
/// Deserializes through the catalog form, so `"trigger": ""` means no trigger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(from = "StoredFrame")]
pub struct Frame {
    /// Index reported to observers (usually a sprite index), not the position in the clip.
    index: usize,
    /// Multiplier applied to the clip frame rate while this frame is current.
    speed: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger: Option<String>,
}

impl Frame {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            speed: 1.0,
            trigger: None,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Attach a trigger name. An empty name means "no trigger".
    pub fn with_trigger(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.trigger = if name.is_empty() { None } else { Some(name) };
        self
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    #[inline]
    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }
}

/// Named, ordered sequence of frames plus playback metadata.
///
/// Serialized in the clip catalog layout; deserializing applies the catalog
/// defaults and rejects clips that fail [`Clip::validate`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "StoredClip")]
pub struct Clip {
    name: String,
    #[serde(rename = "loop")]
    looping: bool,
    random_start: bool,
    frame_rate: f32,
    frames: Vec<Frame>,
}

impl Clip {
    /// Create a looping clip at [`DEFAULT_FRAME_RATE`] that starts on its first frame.
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            name: name.into(),
            looping: true,
            random_start: false,
            frame_rate: DEFAULT_FRAME_RATE,
            frames,
        }
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_random_start(mut self, random_start: bool) -> Self {
        self.random_start = random_start;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Wrap into a shareable handle.
    pub fn into_ref(self) -> ClipRef {
        Arc::new(self)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looping clips never complete.
    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn random_start(&self) -> bool {
        self.random_start
    }

    #[inline]
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at position `i`, or `FrameOutOfRange`.
    pub fn frame_at(&self, i: usize) -> Result<&Frame> {
        self.frames.get(i).ok_or(FlipbookError::FrameOutOfRange {
            index: i,
            frame_count: self.frames.len(),
        })
    }

    /// Validate rate and speeds (finite, > 0). Empty clips are valid data;
    /// animators refuse to play them.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(FlipbookError::InvalidClip {
                name: self.name.clone(),
                reason: format!("frame rate must be > 0, got {}", self.frame_rate),
            });
        }
        for (pos, frame) in self.frames.iter().enumerate() {
            if !frame.speed.is_finite() || frame.speed <= 0.0 {
                return Err(FlipbookError::InvalidClip {
                    name: self.name.clone(),
                    reason: format!("frame {pos} speed must be > 0, got {}", frame.speed),
                });
            }
        }
        Ok(())
    }
}

/// True when both handles point at the very same clip instance.
#[inline]
pub fn same_clip(a: &ClipRef, b: &ClipRef) -> bool {
    Arc::ptr_eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk() -> Clip {
        Clip::new(
            "Walk",
            vec![
                Frame::new(4),
                Frame::new(5).with_speed(0.5).with_trigger("footstep"),
                Frame::new(6).with_trigger(""),
            ],
        )
    }

    #[test]
    fn defaults_follow_authoring_defaults() {
        let clip = walk();
        assert!(clip.is_looping());
        assert!(!clip.random_start());
        assert_eq!(clip.frame_rate(), DEFAULT_FRAME_RATE);
        assert_eq!(clip.frame_count(), 3);
    }

    #[test]
    fn frame_at_reports_out_of_range() {
        let clip = walk();
        assert_eq!(clip.frame_at(1).unwrap().index(), 5);
        assert_eq!(
            clip.frame_at(3),
            Err(FlipbookError::FrameOutOfRange {
                index: 3,
                frame_count: 3
            })
        );
    }

    #[test]
    fn empty_trigger_means_no_trigger() {
        let clip = walk();
        assert_eq!(clip.frames()[1].trigger(), Some("footstep"));
        assert!(!clip.frames()[2].has_trigger());
    }

    #[test]
    fn validate_rejects_bad_rates() {
        assert!(walk().validate().is_ok());
        assert!(walk().with_frame_rate(0.0).validate().is_err());
        let bad_speed = Clip::new("Bad", vec![Frame::new(0).with_speed(-1.0)]);
        assert!(matches!(
            bad_speed.validate(),
            Err(FlipbookError::InvalidClip { .. })
        ));
    }

    #[test]
    fn deserializing_normalises_triggers_and_validates() {
        let clip: Clip = serde_json::from_str(
            r#"{ "name": "Walk", "frameRate": 12, "frames": [ { "index": 1, "trigger": "" }, { "index": 2, "trigger": "step" } ] }"#,
        )
        .unwrap();
        assert!(clip.is_looping());
        assert_eq!(clip.frame_rate(), 12.0);
        assert!(!clip.frames()[0].has_trigger());
        assert_eq!(clip.frames()[1].trigger(), Some("step"));

        let frame: Frame = serde_json::from_str(r#"{ "index": 3, "trigger": "" }"#).unwrap();
        assert_eq!(frame, Frame::new(3));

        let err = serde_json::from_str::<Clip>(r#"{ "name": "Broken", "frameRate": 0 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("Invalid clip 'Broken'"));
    }

    #[test]
    fn serializes_in_catalog_layout() {
        let clip = walk().with_random_start(true);
        let json = serde_json::to_value(&clip).unwrap();
        assert_eq!(json["loop"], true);
        assert_eq!(json["randomStart"], true);
        assert_eq!(json["frameRate"], 8.0);
        assert!(json["frames"][0].get("trigger").is_none());

        let back: Clip = serde_json::from_value(json).unwrap();
        assert_eq!(back, clip);
    }

    #[test]
    fn identity_is_pointer_based() {
        let a = walk().into_ref();
        let b = walk().into_ref();
        assert_eq!(*a, *b);
        assert!(!same_clip(&a, &b));
        assert!(same_clip(&a, &a.clone()));
    }
}
