use battle_core::{CombatantId, SubmitError};

/// Errors surfaced by the battle orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// A frame handed to [`Battle::submit`](crate::Battle::submit) was
    /// rejected by the stack machine.
    #[error("frame submission rejected: {0}")]
    Submit(#[from] SubmitError),

    /// A lookup referenced a combatant that is not on the timeline.
    #[error("{0} is not on the timeline")]
    UnknownCombatant(CombatantId),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
