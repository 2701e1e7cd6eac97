//! Turn content supplier.

use battle_core::{ActionFrame, CombatantId, Timeline};

/// Builds the "this combatant's turn" frame for a scheduled actor.
///
/// This is the seam where ability, movement, and AI content plugs in: the
/// orchestrator knows *when* a combatant acts, the provider knows *what* the
/// turn contains. The provider receives a read-only view of the timeline so
/// turn content can depend on the current order (e.g. delay abilities).
///
/// The sentinel never reaches the provider; round boundaries are handled by
/// the orchestrator itself.
pub trait TurnProvider<C> {
    fn turn_frame(&mut self, actor: CombatantId, timeline: &Timeline) -> ActionFrame<C>;
}

/// Blanket impl so a plain closure can serve as a provider in tests and
/// simple hosts.
impl<C, F> TurnProvider<C> for F
where
    F: FnMut(CombatantId, &Timeline) -> ActionFrame<C>,
{
    fn turn_frame(&mut self, actor: CombatantId, timeline: &Timeline) -> ActionFrame<C> {
        self(actor, timeline)
    }
}
