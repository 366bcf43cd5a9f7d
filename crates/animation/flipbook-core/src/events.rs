//! Node notifications and observer registration.
//!
//! Notifications are delivered synchronously, on the call stack of the
//! `play`/`tick`/`pause`/`resume` call that produced them. For one frame the
//! order is always frame-changed first, then its trigger.
//! A node can additionally keep a journal of the same events that its owner
//! drains afterwards (see [`crate::outputs::Outputs`]).

use serde::{Deserialize, Serialize};

use crate::ids::{IdAllocator, ObserverId};

/// Discrete signal emitted by a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FrameEvent {
    /// The cursor landed on a frame; carries the frame's reported index.
    FrameChanged { index: usize },
    /// The current frame carries a trigger.
    Trigger { name: String },
    /// A non-looping clip ran past its last frame.
    ClipComplete,
    /// A clip gate switched on or off.
    ActiveChanged { active: bool },
}

type FrameChangedFn = Box<dyn FnMut(usize)>;
type TriggerFn = Box<dyn FnMut(&str)>;
type ClipCompleteFn = Box<dyn FnMut()>;
type ActiveChangedFn = Box<dyn FnMut(bool)>;

/// Registered callbacks, one list per event kind.
#[derive(Default)]
pub struct Observers {
    ids: IdAllocator,
    frame_changed: Vec<(ObserverId, FrameChangedFn)>,
    trigger: Vec<(ObserverId, TriggerFn)>,
    clip_complete: Vec<(ObserverId, ClipCompleteFn)>,
    active_changed: Vec<(ObserverId, ActiveChangedFn)>,
}

impl Observers {
    pub fn on_frame_changed(&mut self, f: impl FnMut(usize) + 'static) -> ObserverId {
        let id = self.ids.alloc_observer();
        self.frame_changed.push((id, Box::new(f)));
        id
    }

    pub fn on_trigger(&mut self, f: impl FnMut(&str) + 'static) -> ObserverId {
        let id = self.ids.alloc_observer();
        self.trigger.push((id, Box::new(f)));
        id
    }

    pub fn on_clip_complete(&mut self, f: impl FnMut() + 'static) -> ObserverId {
        let id = self.ids.alloc_observer();
        self.clip_complete.push((id, Box::new(f)));
        id
    }

    pub fn on_active_changed(&mut self, f: impl FnMut(bool) + 'static) -> ObserverId {
        let id = self.ids.alloc_observer();
        self.active_changed.push((id, Box::new(f)));
        id
    }

    /// Detach one observer. Returns false if the id is unknown.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.len();
        self.frame_changed.retain(|(oid, _)| *oid != id);
        self.trigger.retain(|(oid, _)| *oid != id);
        self.clip_complete.retain(|(oid, _)| *oid != id);
        self.active_changed.retain(|(oid, _)| *oid != id);
        self.len() != before
    }

    pub fn clear(&mut self) {
        self.frame_changed.clear();
        self.trigger.clear();
        self.clip_complete.clear();
        self.active_changed.clear();
    }

    pub fn len(&self) -> usize {
        self.frame_changed.len()
            + self.trigger.len()
            + self.clip_complete.len()
            + self.active_changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&mut self, event: &FrameEvent) {
        match event {
            FrameEvent::FrameChanged { index } => {
                for (_, f) in self.frame_changed.iter_mut() {
                    f(*index);
                }
            }
            FrameEvent::Trigger { name } => {
                for (_, f) in self.trigger.iter_mut() {
                    f(name);
                }
            }
            FrameEvent::ClipComplete => {
                for (_, f) in self.clip_complete.iter_mut() {
                    f();
                }
            }
            FrameEvent::ActiveChanged { active } => {
                for (_, f) in self.active_changed.iter_mut() {
                    f(*active);
                }
            }
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("frame_changed", &self.frame_changed.len())
            .field("trigger", &self.trigger.len())
            .field("clip_complete", &self.clip_complete.len())
            .field("active_changed", &self.active_changed.len())
            .finish()
    }
}

/// Observers plus an optional journal of everything emitted.
#[derive(Debug, Default)]
pub struct Notifier {
    pub observers: Observers,
    journal: Option<Vec<FrameEvent>>,
}

impl Notifier {
    /// Start or stop journaling. Stopping discards pending entries.
    pub fn set_journal(&mut self, enabled: bool) {
        match (enabled, self.journal.is_some()) {
            (true, false) => self.journal = Some(Vec::new()),
            (false, true) => self.journal = None,
            _ => {}
        }
    }

    #[inline]
    pub fn is_journaling(&self) -> bool {
        self.journal.is_some()
    }

    /// Deliver to observers first, then record.
    pub fn emit(&mut self, event: FrameEvent) {
        self.observers.notify(&event);
        if let Some(journal) = self.journal.as_mut() {
            journal.push(event);
        }
    }

    /// Take everything recorded since the previous call.
    pub fn drain_journal(&mut self) -> Vec<FrameEvent> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_to_matching_kind_only() {
        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let mut obs = Observers::default();
        let s = seen.clone();
        obs.on_frame_changed(move |i| s.borrow_mut().push(format!("frame {i}")));
        let s = seen.clone();
        obs.on_trigger(move |t| s.borrow_mut().push(format!("trigger {t}")));

        obs.notify(&FrameEvent::FrameChanged { index: 2 });
        obs.notify(&FrameEvent::Trigger {
            name: "footstep".into(),
        });
        obs.notify(&FrameEvent::ClipComplete);

        assert_eq!(*seen.borrow(), ["frame 2", "trigger footstep"]);
    }

    #[test]
    fn remove_detaches_single_observer() {
        let count = Rc::new(RefCell::new(0));
        let mut obs = Observers::default();
        let c = count.clone();
        let first = obs.on_clip_complete(move || *c.borrow_mut() += 1);
        let c = count.clone();
        obs.on_clip_complete(move || *c.borrow_mut() += 10);

        assert!(obs.remove(first));
        assert!(!obs.remove(first));
        obs.notify(&FrameEvent::ClipComplete);
        assert_eq!(*count.borrow(), 10);
        assert_eq!(obs.len(), 1);
    }

    #[test]
    fn journal_records_only_when_enabled() {
        let mut n = Notifier::default();
        n.emit(FrameEvent::ClipComplete);
        assert!(n.drain_journal().is_empty());

        n.set_journal(true);
        n.emit(FrameEvent::FrameChanged { index: 1 });
        n.emit(FrameEvent::ClipComplete);
        assert_eq!(
            n.drain_journal(),
            vec![FrameEvent::FrameChanged { index: 1 }, FrameEvent::ClipComplete]
        );
        assert!(n.drain_journal().is_empty());
    }
}
