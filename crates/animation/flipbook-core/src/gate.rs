//! Clip gates: layers that switch on for a set of clip names.
//!
//! A gate has no frames of its own. It stands in for transform or particle
//! layers that should only be active while the parent plays certain clips.

use indexmap::IndexSet;
use log::trace;

use crate::data::ClipRef;
use crate::events::{FrameEvent, Notifier, Observers};
use crate::ids::ObserverId;

#[derive(Debug, Default)]
pub struct ClipGate {
    names: IndexSet<String>,
    active: bool,
    paused: bool,
    disposed: bool,
    notifier: Notifier,
}

impl ClipGate {
    /// Gate enabled by any of `names`, initially inactive.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.active && !self.paused
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn observers_mut(&mut self) -> &mut Observers {
        &mut self.notifier.observers
    }

    pub fn on_active_changed(&mut self, f: impl FnMut(bool) + 'static) -> ObserverId {
        self.notifier.observers.on_active_changed(f)
    }

    pub(crate) fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Activate iff `name` is one of the gate's clips; deactivate otherwise.
    pub fn play_named(&mut self, name: &str) -> bool {
        if self.disposed {
            return false;
        }
        let accepted = self.accepts(name);
        trace!("gate {} clip '{name}'", if accepted { "accepts" } else { "rejects" });
        if accepted {
            self.paused = false;
        }
        self.set_active(accepted);
        accepted
    }

    /// Gates only look at the clip name.
    pub fn play(&mut self, clip: &ClipRef) -> bool {
        self.play_named(clip.name())
    }

    pub fn pause(&mut self) {
        if self.active {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn dispose(&mut self) {
        self.notifier.observers.clear();
        self.notifier.set_journal(false);
        self.active = false;
        self.paused = false;
        self.disposed = true;
    }

    fn set_active(&mut self, active: bool) {
        if self.active != active {
            self.active = active;
            self.notifier.emit(FrameEvent::ActiveChanged { active });
        }
    }
}
