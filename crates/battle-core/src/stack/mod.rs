//! Cooperative action stack machine.
//!
//! Executes a tree of nested actions (attacks, movements, passive triggers,
//! UI-driven waits) with deterministic insertion-order guarantees when new
//! actions are spawned while other actions are mid-execution.

mod frame;
mod machine;

pub use frame::{
    ActionFrame, FrameBody, FrameState, Spawner, Step, StepFn, SuspendCondition, SuspendPredicate,
};
pub use machine::{StackMachine, StepOutcome};
