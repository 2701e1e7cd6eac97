//! Error types for the scheduling core.
//!
//! The engine is deliberately hard to break: overruns, empty-stack steps, and
//! zero-speed combatants are reported as outcomes and diagnostics, not errors.
//! The only operation that can be rejected outright is submitting a frame
//! that is not fresh.

use crate::stack::FrameState;

/// Errors surfaced while submitting a frame to the stack machine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The frame has already been submitted (its state has left `Created`).
    /// A frame may be pushed onto the global stack at most once.
    #[error("frame already submitted (state is {state}, expected Created)")]
    AlreadySubmitted { state: FrameState },
}
