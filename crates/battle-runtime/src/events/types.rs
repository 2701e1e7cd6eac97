//! Typed event payloads carried by the bus.

use battle_core::CombatantId;
use serde::{Deserialize, Serialize};

/// Turn lifecycle events for real combatants, plus round boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// The timeline selected this combatant and its turn frame was submitted.
    TurnStarted { actor: CombatantId },
    /// The combatant's turn frame (and every descendant) reached `Ended` and
    /// the combatant was reset on the timeline.
    TurnEnded { actor: CombatantId },
    /// The sentinel acted: every combatant has had at least one turn since
    /// the previous boundary. `round` counts completed rounds from 1.
    RoundEnded { round: u64 },
}

/// Frame lifecycle events mirrored from the core observer hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameEvent {
    Started { label: String, depth: usize },
    Ended { label: String, depth: usize },
}

/// Timeline ordering events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineEvent {
    /// The timeline re-sorted; `order` is soonest-first and includes the
    /// sentinel.
    Reordered { order: Vec<CombatantId> },
}
