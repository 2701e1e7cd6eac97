//! Battle orchestrator glue over [`battle_core`].
//!
//! `battle-runtime` wires the initiative timeline to the action stack
//! machine: each scheduled actor gets one "entity turn" frame, the host's
//! tick drives the machine until that frame and all its descendants end, and
//! the actor is reset on the timeline. Lifecycle notifications are mirrored
//! onto a topic-based event bus for UI, logging, and audio listeners.
pub mod battle;
pub mod error;
pub mod events;
pub mod provider;

pub use battle::{Battle, TickReport};
pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, FrameEvent, TimelineEvent, Topic, TurnEvent};
pub use provider::TurnProvider;
