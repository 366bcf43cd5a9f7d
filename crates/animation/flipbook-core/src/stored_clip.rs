use serde::Deserialize;

use crate::data::{Clip, Frame, DEFAULT_FRAME_RATE};
use crate::error::FlipbookError;
use crate::library::ClipLibrary;
use crate::Result;

/// Public API: parse a clip catalog JSON document into validated clips.
///
/// ```json
/// { "clips": [ { "name": "Walk", "loop": true, "randomStart": false, "frameRate": 12,
///                "frames": [ { "index": 0 }, { "index": 1, "speed": 0.5, "trigger": "footstep" } ] } ] }
/// ```
///
/// Notes:
/// - Omitted fields take the authoring defaults: `loop = true`, `randomStart = false`,
///   `frameRate = 8`, `index = 0`, `speed = 1`.
/// - An empty `trigger` string is treated as no trigger.
/// - Clips are validated (positive frame rate and speeds); empty clips are accepted
///   as data and rejected only when played.
pub fn parse_clip_catalog_json(s: &str) -> Result<Vec<Clip>> {
    let catalog: StoredCatalog = serde_json::from_str(s)?;
    catalog.clips.into_iter().map(to_core_clip).collect()
}

/// Parse a catalog straight into a library; duplicate names are an error.
pub fn parse_clip_library_json(s: &str) -> Result<ClipLibrary> {
    ClipLibrary::from_clips(parse_clip_catalog_json(s)?)
}

fn to_core_clip(sc: StoredClip) -> Result<Clip> {
    let clip = Clip::new(sc.name, sc.frames.into_iter().map(Frame::from).collect())
        .with_loop(sc.looping)
        .with_random_start(sc.random_start)
        .with_frame_rate(sc.frame_rate);
    clip.validate()?;
    Ok(clip)
}

impl TryFrom<StoredClip> for Clip {
    type Error = FlipbookError;

    fn try_from(sc: StoredClip) -> Result<Self> {
        to_core_clip(sc)
    }
}

impl From<StoredFrame> for Frame {
    fn from(sf: StoredFrame) -> Self {
        let frame = Frame::new(sf.index).with_speed(sf.speed);
        match sf.trigger {
            Some(name) => frame.with_trigger(name),
            None => frame,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoredCatalog {
    clips: Vec<StoredClip>,
}

/// Authored form of a clip, before defaults are checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredClip {
    name: String,
    #[serde(rename = "loop", default = "default_true")]
    looping: bool,
    #[serde(default)]
    random_start: bool,
    #[serde(default = "default_frame_rate")]
    frame_rate: f32,
    #[serde(default)]
    frames: Vec<StoredFrame>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoredFrame {
    #[serde(default)]
    index: usize,
    #[serde(default = "default_speed")]
    speed: f32,
    #[serde(default)]
    trigger: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

fn default_speed() -> f32 {
    1.0
}
