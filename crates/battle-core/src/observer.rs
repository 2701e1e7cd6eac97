//! Lifecycle notification hub.
//!
//! The engine broadcasts "frame started" / "frame ended" / "timeline
//! reordered" to an explicit observer list instead of a delegate or a global
//! channel. Any number of subscribers (UI, logging, audio) may listen; the
//! core never depends on them, and observers only ever receive borrowed
//! summaries, so they cannot call back into the engine mid-step.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::timeline::CombatantId;

/// Snapshot of a frame handed to observers. Carries no closures and no state
/// the observer could mutate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSummary {
    /// Human-readable label the frame was constructed with.
    pub label: String,
    /// Depth of the frame on the global stack (0 = root frame).
    pub depth: usize,
}

/// A subscriber to engine lifecycle notifications.
///
/// All methods default to no-ops so observers only implement what they need.
pub trait BattleObserver: Send + Sync {
    /// A frame transitioned out of `Stacked` and began executing.
    fn frame_started(&self, _frame: &FrameSummary) {}

    /// A frame finished its steps and drained all children.
    fn frame_ended(&self, _frame: &FrameSummary) {}

    /// The timeline re-sorted its entities. `order` is front-to-back,
    /// soonest actor first.
    fn timeline_reordered(&self, _order: &[CombatantId]) {}
}

/// Token returned by [`ObserverHub::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Shared, cloneable observer list.
///
/// Both the [`Timeline`](crate::timeline::Timeline) and the
/// [`StackMachine`](crate::stack::StackMachine) hold a clone of the same hub,
/// so the orchestrator subscribes once and sees every notification.
pub struct ObserverHub {
    inner: Arc<RwLock<Vec<(ObserverId, Arc<dyn BattleObserver>)>>>,
    next_id: Arc<AtomicU64>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registers an observer and returns a token for unsubscribing.
    pub fn subscribe(&self, observer: Arc<dyn BattleObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut observers) = self.inner.write() {
            observers.push((id, observer));
        }
        id
    }

    /// Removes an observer. Returns true if it was subscribed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        match self.inner.write() {
            Ok(mut observers) => {
                let before = observers.len();
                observers.retain(|(oid, _)| *oid != id);
                observers.len() != before
            }
            Err(_) => false,
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.inner.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn notify_frame_started(&self, frame: &FrameSummary) {
        self.for_each(|o| o.frame_started(frame));
    }

    pub(crate) fn notify_frame_ended(&self, frame: &FrameSummary) {
        self.for_each(|o| o.frame_ended(frame));
    }

    pub(crate) fn notify_timeline_reordered(&self, order: &[CombatantId]) {
        self.for_each(|o| o.timeline_reordered(order));
    }

    fn for_each(&self, f: impl Fn(&dyn BattleObserver)) {
        // Notifications are best-effort; a poisoned lock drops them rather
        // than taking the engine down.
        let Ok(observers) = self.inner.read() else {
            tracing::debug!(target: "battle_core::observer", "observer list poisoned, dropping notification");
            return;
        };
        for (_, observer) in observers.iter() {
            f(observer.as_ref());
        }
    }
}

impl Clone for ObserverHub {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl Default for ObserverHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        started: Mutex<Vec<String>>,
    }

    impl BattleObserver for Recorder {
        fn frame_started(&self, frame: &FrameSummary) {
            self.started.lock().unwrap().push(frame.label.clone());
        }
    }

    #[test]
    fn subscribe_and_unsubscribe() {
        let hub = ObserverHub::new();
        let recorder = Arc::new(Recorder {
            started: Mutex::new(Vec::new()),
        });
        let id = hub.subscribe(recorder.clone());
        assert_eq!(hub.len(), 1);

        hub.notify_frame_started(&FrameSummary {
            label: "attack".into(),
            depth: 0,
        });
        assert_eq!(*recorder.started.lock().unwrap(), vec!["attack"]);

        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.notify_frame_started(&FrameSummary {
            label: "ignored".into(),
            depth: 0,
        });
        assert_eq!(recorder.started.lock().unwrap().len(), 1);
    }

    #[test]
    fn clones_share_the_same_list() {
        let hub = ObserverHub::new();
        let clone = hub.clone();
        let recorder = Arc::new(Recorder {
            started: Mutex::new(Vec::new()),
        });
        hub.subscribe(recorder.clone());

        clone.notify_frame_started(&FrameSummary {
            label: "shared".into(),
            depth: 2,
        });
        assert_eq!(*recorder.started.lock().unwrap(), vec!["shared"]);
    }
}
