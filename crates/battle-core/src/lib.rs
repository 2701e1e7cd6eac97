//! Turn-resolution engine for a tile-tactics battle simulator.
//!
//! `battle-core` decides who acts next and in what order nested game events
//! resolve. It has two tightly coupled halves: the [`timeline`] (a
//! continuous-time initiative scheduler over a decaying "distance to act")
//! and the [`stack`] (a single-threaded cooperative machine executing trees
//! of nested action frames). Rendering, tile geometry, and ability content
//! are external collaborators reached only through closures and the
//! [`observer`] notification hub; the engine performs no timing and no I/O
//! of its own.
pub mod config;
pub mod error;
pub mod observer;
pub mod stack;
pub mod timeline;

pub use config::BattleConfig;
pub use error::SubmitError;
pub use observer::{BattleObserver, FrameSummary, ObserverHub, ObserverId};
pub use stack::{
    ActionFrame, FrameState, Spawner, StackMachine, Step, StepOutcome, SuspendCondition,
};
pub use timeline::{
    CombatantId, CombatantProfile, PortraitId, TeamId, Timeline, TimelineEntity,
};
