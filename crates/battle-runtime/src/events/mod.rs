//! Topic-based event bus for battle events.
//!
//! Events are published to specific topics and consumers subscribe only to
//! the topics they need. The [`BusBridge`] observer forwards core engine
//! notifications (frame lifecycle, timeline reorders) onto the bus so
//! external listeners never touch the engine directly.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{FrameEvent, TimelineEvent, TurnEvent};

use battle_core::{BattleObserver, CombatantId, FrameSummary};

/// Forwards core observer notifications onto the event bus.
pub(crate) struct BusBridge {
    bus: EventBus,
}

impl BusBridge {
    pub(crate) fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl BattleObserver for BusBridge {
    fn frame_started(&self, frame: &FrameSummary) {
        self.bus.publish(Event::Frame(FrameEvent::Started {
            label: frame.label.clone(),
            depth: frame.depth,
        }));
    }

    fn frame_ended(&self, frame: &FrameSummary) {
        self.bus.publish(Event::Frame(FrameEvent::Ended {
            label: frame.label.clone(),
            depth: frame.depth,
        }));
    }

    fn timeline_reordered(&self, order: &[CombatantId]) {
        self.bus.publish(Event::Timeline(TimelineEvent::Reordered {
            order: order.to_vec(),
        }));
    }
}
