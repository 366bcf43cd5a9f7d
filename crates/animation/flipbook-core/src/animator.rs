//! Frame animator: the playback cursor over one clip.
//!
//! Time is accumulated in units of whole frames
//! (`dt * clip.frame_rate * current_frame.speed`) and every whole unit moves
//! the cursor one frame, so one large `dt` may cross several frames and
//! several loop boundaries within a single `tick`. Leftover fractions carry
//! over to the next tick.

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{same_clip, ClipRef, Frame};
use crate::error::FlipbookError;
use crate::events::{FrameEvent, Notifier, Observers};
use crate::ids::ObserverId;
use crate::library::ClipLibrary;
use crate::Result;

/// Loop cycles one `tick` walks frame by frame. A longer delta drops the
/// surplus whole cycles (and their notifications) and keeps the phase.
const MAX_LOOPS_PER_TICK: f32 = 16.0;

/// Observable playback state of an animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No clip, or a non-looping clip ran to completion
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

/// Playback cursor for a single node.
#[derive(Debug)]
pub struct FrameAnimator {
    clips: ClipLibrary,
    current: Option<ClipRef>,
    playing: bool,
    completed: bool,
    disposed: bool,
    /// Position into `current.frames()`; always valid while `current` is set.
    position: usize,
    /// Sub-frame time budget, in frames.
    accumulated: f32,
    rng: StdRng,
    notifier: Notifier,
}

impl Default for FrameAnimator {
    fn default() -> Self {
        Self::new(ClipLibrary::new())
    }
}

impl FrameAnimator {
    /// Animator over `clips`, with random starts seeded from entropy.
    pub fn new(clips: ClipLibrary) -> Self {
        Self::with_rng(clips, StdRng::from_entropy())
    }

    /// Animator with a reproducible random-start sequence.
    pub fn with_seed(clips: ClipLibrary, seed: u64) -> Self {
        Self::with_rng(clips, StdRng::seed_from_u64(seed))
    }

    fn with_rng(clips: ClipLibrary, rng: StdRng) -> Self {
        Self {
            clips,
            current: None,
            playing: false,
            completed: false,
            disposed: false,
            position: 0,
            accumulated: 0.0,
            rng,
            notifier: Notifier::default(),
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn current_clip(&self) -> Option<&ClipRef> {
        self.current.as_ref()
    }

    /// Cursor position into the current clip (not the frame's reported index).
    #[inline]
    pub fn position(&self) -> Option<usize> {
        self.current.as_ref().map(|_| self.position)
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current
            .as_ref()
            .and_then(|clip| clip.frames().get(self.position))
    }

    #[inline]
    pub fn accumulated_time(&self) -> f32 {
        self.accumulated
    }

    pub fn state(&self) -> PlaybackState {
        if self.current.is_none() || self.completed {
            PlaybackState::Stopped
        } else if self.playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        }
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn clips(&self) -> &ClipLibrary {
        &self.clips
    }

    pub fn observers(&self) -> &Observers {
        &self.notifier.observers
    }

    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.notifier.observers
    }

    pub fn on_frame_changed(&mut self, f: impl FnMut(usize) + 'static) -> ObserverId {
        self.notifier.observers.on_frame_changed(f)
    }

    pub fn on_trigger(&mut self, f: impl FnMut(&str) + 'static) -> ObserverId {
        self.notifier.observers.on_trigger(f)
    }

    pub fn on_clip_complete(&mut self, f: impl FnMut() + 'static) -> ObserverId {
        self.notifier.observers.on_clip_complete(f)
    }

    pub(crate) fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Start `clip` from its first (or a random) frame.
    ///
    /// Returns `Ok(false)` without side effects when `clip` is the very
    /// instance already current, so repeated calls never restart playback.
    /// Empty clips and clips failing [`crate::Clip::validate`] are refused.
    /// The starting frame is dispatched before this returns.
    pub fn play(&mut self, clip: &ClipRef) -> Result<bool> {
        if self.disposed {
            warn!("play('{}') on a disposed animator ignored", clip.name());
            return Ok(false);
        }
        if let Some(current) = &self.current {
            if same_clip(current, clip) {
                return Ok(false);
            }
        }
        if clip.is_empty() {
            return Err(FlipbookError::EmptyClip {
                name: clip.name().to_string(),
            });
        }
        clip.validate()?;

        self.current = Some(clip.clone());
        self.accumulated = 0.0;
        self.playing = true;
        self.completed = false;
        self.position = if clip.random_start() {
            self.rng.gen_range(0..clip.frame_count())
        } else {
            0
        };
        debug!(
            "playing clip '{}' from frame position {}",
            clip.name(),
            self.position
        );
        self.dispatch_frame(self.position);
        Ok(true)
    }

    /// Look `name` up in the local library and play it.
    ///
    /// Returns `Ok(false)` when the name is unknown; whatever was playing
    /// keeps playing.
    pub fn play_named(&mut self, name: &str) -> Result<bool> {
        match self.clips.get(name).cloned() {
            Some(clip) => {
                self.play(&clip)?;
                Ok(true)
            }
            None => {
                trace!("no clip named '{name}' in library");
                Ok(false)
            }
        }
    }

    /// Play the first library clip unless something is already playing.
    pub fn autoplay(&mut self) -> Result<bool> {
        if self.playing {
            return Ok(false);
        }
        match self.clips.first().cloned() {
            Some(clip) => self.play(&clip),
            None => Ok(false),
        }
    }

    /// Stop advancing; clip, position and accumulated time are kept.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Continue from where `pause` left off. Without a clip this does nothing.
    pub fn resume(&mut self) {
        if self.current.is_some() && !self.disposed {
            self.playing = true;
            self.completed = false;
        }
    }

    /// Advance the cursor by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.disposed {
            warn!("tick on a disposed animator ignored");
            return;
        }
        if !self.playing {
            return;
        }
        let Some(clip) = self.current.clone() else {
            return;
        };
        if !dt.is_finite() || dt < 0.0 {
            warn!("ignoring invalid tick delta {dt}");
            return;
        }

        // Speed of the frame the cursor sits on before advancing.
        let speed = clip.frames()[self.position].speed();
        let step = dt * clip.frame_rate() * speed;
        if !step.is_finite() {
            warn!("tick delta {dt} overflows clip '{}'; ignored", clip.name());
            return;
        }
        self.accumulated += step;

        if clip.is_looping() {
            let cycle = clip.frame_count() as f32;
            if self.accumulated >= cycle * MAX_LOOPS_PER_TICK {
                // Whole cycles leave the cursor where it is.
                debug!(
                    "clip '{}': skipping {} whole loops in one tick",
                    clip.name(),
                    (self.accumulated / cycle).floor()
                );
                self.accumulated %= cycle;
            }
        }

        while self.accumulated >= 1.0 {
            self.accumulated -= 1.0;
            let next = self.position + 1;
            if next >= clip.frame_count() {
                if !clip.is_looping() {
                    debug!("clip '{}' complete", clip.name());
                    self.accumulated = 0.0;
                    self.completed = true;
                    self.notifier.emit(FrameEvent::ClipComplete);
                    self.pause();
                    return;
                }
                self.position = 0;
            } else {
                self.position = next;
            }
            self.dispatch_frame(self.position);
        }
    }

    /// Detach every observer and forget the clip. The animator must not be
    /// used afterwards; further calls are ignored.
    pub fn dispose(&mut self) {
        self.notifier.observers.clear();
        self.notifier.set_journal(false);
        self.current = None;
        self.playing = false;
        self.completed = false;
        self.disposed = true;
    }

    fn dispatch_frame(&mut self, position: usize) {
        let Some(clip) = self.current.as_ref() else {
            return;
        };
        let frame = &clip.frames()[position];
        let index = frame.index();
        let trigger = frame.trigger().map(str::to_owned);
        self.notifier.emit(FrameEvent::FrameChanged { index });
        if let Some(name) = trigger {
            self.notifier.emit(FrameEvent::Trigger { name });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Clip, Frame};

    fn three_frames(looping: bool) -> ClipRef {
        Clip::new(
            "clip",
            vec![
                Frame::new(0),
                Frame::new(1).with_speed(0.5),
                Frame::new(2).with_trigger("hit"),
            ],
        )
        .with_loop(looping)
        .with_frame_rate(1.0)
        .into_ref()
    }

    #[test]
    fn initial_state_is_stopped() {
        let anim = FrameAnimator::default();
        assert_eq!(anim.state(), PlaybackState::Stopped);
        assert!(anim.current_clip().is_none());
        assert_eq!(anim.position(), None);
    }

    #[test]
    fn fractional_time_carries_over() {
        let mut anim = FrameAnimator::default();
        anim.play(&three_frames(true)).unwrap();
        anim.tick(0.4);
        anim.tick(0.4);
        assert_eq!(anim.position(), Some(0));
        anim.tick(0.4);
        assert_eq!(anim.position(), Some(1));
        assert!((anim.accumulated_time() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn completion_keeps_cursor_valid() {
        let mut anim = FrameAnimator::default();
        anim.play(&three_frames(false)).unwrap();
        for _ in 0..10 {
            anim.tick(1.0);
        }
        assert_eq!(anim.state(), PlaybackState::Stopped);
        assert_eq!(anim.position(), Some(2));
        assert_eq!(anim.accumulated_time(), 0.0);
    }

    #[test]
    fn invalid_delta_is_ignored() {
        let mut anim = FrameAnimator::default();
        anim.play(&three_frames(true)).unwrap();
        anim.tick(f32::NAN);
        anim.tick(-1.0);
        anim.tick(f32::INFINITY);
        assert_eq!(anim.position(), Some(0));
        assert_eq!(anim.accumulated_time(), 0.0);
    }

    #[test]
    fn dispose_is_terminal() {
        let mut anim = FrameAnimator::default();
        let clip = three_frames(true);
        anim.on_frame_changed(|_| {});
        anim.play(&clip).unwrap();
        anim.dispose();
        assert!(anim.is_disposed());
        assert!(anim.observers().is_empty());
        assert!(anim.current_clip().is_none());
        assert_eq!(anim.play(&clip), Ok(false));
        anim.resume();
        assert!(!anim.is_playing());
    }
}
