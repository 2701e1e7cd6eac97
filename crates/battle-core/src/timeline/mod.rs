//! Initiative timeline: "who acts next" and clock advancement.
//!
//! The timeline orders an arbitrary, dynamically changing set of combatants
//! by a decaying "distance to act" value. Advancing the timeline is a
//! discrete-event jump: the clock moves straight to the head's ready time and
//! every participant's progress decays proportionally.
//!
//! A synthetic sentinel participant is always present. It is rescheduled
//! behind every real participant after its own "turn", so selecting it marks
//! a round boundary.

mod entity;

pub use entity::{CombatantId, CombatantProfile, PortraitId, TeamId, TimelineEntity};

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::config::BattleConfig;
use crate::observer::ObserverHub;

/// Ordered collection of timeline entities plus the round-boundary sentinel.
pub struct Timeline {
    /// Kept sorted (soonest first) after every mutating operation.
    entities: Vec<TimelineEntity>,
    /// Monotonic insertion sequence for real participants. The sentinel does
    /// not consume it.
    next_join_index: i64,
    config: BattleConfig,
    observers: ObserverHub,
}

impl Timeline {
    /// Creates an empty timeline containing only the sentinel.
    pub fn new(config: BattleConfig, observers: ObserverHub) -> Self {
        let sentinel_profile = CombatantProfile::new(
            CombatantId::SENTINEL,
            config.fallback_sentinel_speed,
            0,
        );
        // Placeholder placement; every membership change recomputes it.
        let sentinel = TimelineEntity::new(
            sentinel_profile,
            config.reset_distance + config.sentinel_epsilon,
            -1,
        );
        Self {
            entities: vec![sentinel],
            next_join_index: 0,
            config,
            observers,
        }
    }

    /// Adds a combatant to the timeline.
    ///
    /// `use_initiative` seeds the starting distance from the profile's
    /// initiative; otherwise the shared reset distance is used. Returns false
    /// (with a diagnostic) if the id is already present or reserved.
    pub fn insert(&mut self, profile: CombatantProfile, use_initiative: bool) -> bool {
        if profile.id.is_sentinel() {
            warn!(target: "battle_core::timeline", "rejecting insert of reserved sentinel id");
            return false;
        }
        if self.entities.iter().any(|e| e.id() == profile.id) {
            warn!(
                target: "battle_core::timeline",
                id = %profile.id,
                "rejecting duplicate timeline insert"
            );
            return false;
        }

        let distance = if use_initiative {
            f64::from(profile.initiative)
        } else {
            self.config.reset_distance
        };
        let join_index = self.next_join_index;
        self.next_join_index += 1;

        debug!(
            target: "battle_core::timeline",
            id = %profile.id,
            speed = profile.speed,
            distance,
            join_index,
            "combatant joined timeline"
        );
        self.entities
            .push(TimelineEntity::new(profile, distance, join_index));
        // Membership changed: keep the round barrier behind every participant.
        self.recompute_sentinel();
        self.reorder();
        true
    }

    /// Removes a combatant (e.g. on death). The sentinel cannot be removed.
    pub fn remove(&mut self, id: CombatantId) -> bool {
        if id.is_sentinel() {
            warn!(target: "battle_core::timeline", "rejecting removal of the sentinel");
            return false;
        }
        let before = self.entities.len();
        self.entities.retain(|e| e.id() != id);
        let removed = self.entities.len() != before;
        if removed {
            debug!(target: "battle_core::timeline", id = %id, "combatant left timeline");
            self.recompute_sentinel();
            self.reorder();
        }
        removed
    }

    /// Advances the clock to the next actor's ready time and returns that
    /// actor. Always well-defined: the sentinel is always present.
    ///
    /// Every participant's distance decays by `amount * decay_rate`, so all
    /// progress proportionally even though only the head is about to act.
    pub fn advance(&mut self) -> CombatantId {
        self.reorder();

        // The sentinel always has positive speed, so the head always has a
        // finite turn order.
        let head = &self.entities[0];
        let head_id = head.id();
        let amount = head.turn_order().unwrap_or(0.0);

        for entity in &mut self.entities {
            entity.distance -= amount * entity.decay_rate();
        }

        self.reorder();
        debug!(
            target: "battle_core::timeline",
            actor = %head_id,
            consumed = amount,
            "timeline advanced"
        );
        head_id
    }

    /// Puts a combatant back on the timeline after its turn frame finished.
    ///
    /// Real combatants return to the shared reset distance; resetting the
    /// sentinel reschedules it behind every current participant.
    pub fn reset(&mut self, id: CombatantId) {
        if id.is_sentinel() {
            self.recompute_sentinel();
        } else if let Some(entity) = self.entities.iter_mut().find(|e| e.id() == id) {
            entity.distance = self.config.reset_distance;
        } else {
            warn!(target: "battle_core::timeline", id = %id, "reset of unknown combatant ignored");
            return;
        }
        self.reorder();
    }

    /// Current front-to-back acting order.
    pub fn order(&self) -> Vec<CombatantId> {
        self.entities.iter().map(|e| e.id()).collect()
    }

    pub fn get(&self, id: CombatantId) -> Option<&TimelineEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Number of real (non-sentinel) participants.
    pub fn len(&self) -> usize {
        self.entities.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable sort ascending by `(turn_order, join_index)`. Zero-speed
    /// entities have no turn order and sort last.
    fn reorder(&mut self) {
        self.entities.sort_by(compare_entities);
        let order = self.order();
        self.observers.notify_timeline_reordered(&order);
    }

    /// Reschedules the sentinel strictly after every current participant:
    /// speed copied from the slowest positive-speed combatant (fallback when
    /// none), distance just past the furthest combatant. Equal-or-slower speed
    /// plus strictly greater distance means a strictly greater turn order, so
    /// everyone on the timeline acts before the next round boundary. Runs on
    /// every membership change and on sentinel reset.
    fn recompute_sentinel(&mut self) {
        let slowest_speed = self
            .entities
            .iter()
            .filter(|e| !e.is_sentinel() && e.profile.speed > 0)
            .map(|e| e.profile.speed)
            .min()
            .unwrap_or(self.config.fallback_sentinel_speed);
        let furthest = self
            .entities
            .iter()
            .filter(|e| !e.is_sentinel())
            .map(|e| e.distance)
            .fold(0.0_f64, f64::max);

        let epsilon = self.config.sentinel_epsilon;
        if let Some(sentinel) = self.entities.iter_mut().find(|e| e.is_sentinel()) {
            sentinel.profile.speed = slowest_speed;
            sentinel.distance = furthest + epsilon;
        }
    }
}

/// Ordering for the scheduling sort. `None` turn order (zero speed) is
/// treated as "after everything"; exact ties fall back to join index, which
/// puts the sentinel (-1) ahead of any tied real participant.
fn compare_entities(a: &TimelineEntity, b: &TimelineEntity) -> Ordering {
    match (a.turn_order(), b.turn_order()) {
        (Some(x), Some(y)) => x
            .partial_cmp(&y)
            .unwrap_or(Ordering::Equal)
            .then(a.join_index().cmp(&b.join_index())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.join_index().cmp(&b.join_index()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline::new(BattleConfig::default(), ObserverHub::new())
    }

    fn profile(id: u32, speed: u32) -> CombatantProfile {
        CombatantProfile::new(CombatantId(id), speed, 0)
    }

    #[test]
    fn empty_timeline_advances_to_sentinel() {
        let mut tl = timeline();
        assert_eq!(tl.advance(), CombatantId::SENTINEL);
    }

    #[test]
    fn faster_combatant_acts_first() {
        let mut tl = timeline();
        tl.insert(profile(1, 100), false);
        tl.insert(profile(2, 50), false);

        assert_eq!(tl.advance(), CombatantId(1));
    }

    #[test]
    fn worked_scenario_tie_resolved_by_join_index() {
        // reset = 100; A(speed 100) and B(speed 50) both start at 100.
        let mut tl = timeline();
        tl.insert(profile(1, 100), false); // A
        tl.insert(profile(2, 50), false); // B

        // turn_order A = 100, B = 200 -> A first; decay 100*1.0 / 100*0.5.
        assert_eq!(tl.advance(), CombatantId(1));
        assert_eq!(tl.get(CombatantId(1)).unwrap().distance(), 0.0);
        assert_eq!(tl.get(CombatantId(2)).unwrap().distance(), 50.0);

        tl.reset(CombatantId(1));
        assert_eq!(tl.get(CombatantId(1)).unwrap().distance(), 100.0);

        // Both now at turn order 100: exact tie, A joined first.
        assert_eq!(tl.advance(), CombatantId(1));
    }

    #[test]
    fn initiative_seeds_starting_distance() {
        let mut tl = timeline();
        tl.insert(CombatantProfile::new(CombatantId(1), 100, 30), true);
        tl.insert(profile(2, 100), false);

        // 30 vs 100 at equal speed: the initiative joiner acts first.
        assert_eq!(tl.advance(), CombatantId(1));
        // The other decayed by the same 30 clock units.
        assert_eq!(tl.get(CombatantId(2)).unwrap().distance(), 70.0);
    }

    #[test]
    fn decay_is_proportional_to_consumed_clock() {
        let mut tl = timeline();
        tl.insert(profile(1, 100), false);
        tl.insert(profile(2, 50), false);

        // Shadow-account A's and B's distances: nothing may move them except
        // proportional decay and their own resets.
        let mut expected_a = 100.0;
        let mut expected_b = 100.0;
        for _ in 0..6 {
            let head = tl.order()[0];
            let amount = tl.get(head).unwrap().turn_order().unwrap();
            let actor = tl.advance();
            assert_eq!(actor, head);

            expected_a -= amount * 1.0;
            expected_b -= amount * 0.5;
            assert_eq!(tl.get(CombatantId(1)).unwrap().distance(), expected_a);
            assert_eq!(tl.get(CombatantId(2)).unwrap().distance(), expected_b);

            tl.reset(actor);
            if actor == CombatantId(1) {
                expected_a = tl.get(CombatantId(1)).unwrap().distance();
            } else if actor == CombatantId(2) {
                expected_b = tl.get(CombatantId(2)).unwrap().distance();
            }
        }
    }

    #[test]
    fn sentinel_marks_round_boundary_once_per_cycle() {
        // Equal speeds: every combatant acts exactly once per round, so the
        // sentinel fires exactly once per K real turns.
        let mut tl = timeline();
        tl.insert(profile(1, 100), false);
        tl.insert(profile(2, 100), false);
        tl.insert(profile(3, 100), false);

        let mut sentinel_turns = 0;
        let mut real_turns = 0;
        for _ in 0..40 {
            let actor = tl.advance();
            if actor.is_sentinel() {
                sentinel_turns += 1;
            } else {
                real_turns += 1;
            }
            tl.reset(actor);
        }
        assert_eq!(real_turns, sentinel_turns * 3);
    }

    #[test]
    fn every_combatant_acts_before_each_round_boundary() {
        // Mixed speeds: fast combatants may act more than once per round, but
        // nobody is skipped when the sentinel comes up.
        let mut tl = timeline();
        tl.insert(profile(1, 100), false);
        tl.insert(profile(2, 80), false);
        tl.insert(profile(3, 60), false);

        let mut acted_this_round = std::collections::HashSet::new();
        let mut completed_rounds = 0;
        for _ in 0..60 {
            let actor = tl.advance();
            if actor.is_sentinel() {
                assert_eq!(acted_this_round.len(), 3, "round ended before everyone acted");
                acted_this_round.clear();
                completed_rounds += 1;
            } else {
                acted_this_round.insert(actor);
            }
            tl.reset(actor);
        }
        assert!(completed_rounds > 3);
    }

    #[test]
    fn zero_speed_combatant_is_never_selected() {
        let mut tl = timeline();
        tl.insert(profile(1, 0), false);
        tl.insert(profile(2, 100), false);

        for _ in 0..10 {
            let actor = tl.advance();
            assert_ne!(actor, CombatantId(1));
            tl.reset(actor);
            // Its distance never decays either.
            assert_eq!(tl.get(CombatantId(1)).unwrap().distance(), 100.0);
        }
    }

    #[test]
    fn all_zero_speed_degenerates_to_sentinel_rotation() {
        let mut tl = timeline();
        tl.insert(profile(1, 0), false);
        tl.insert(profile(2, 0), false);

        for _ in 0..5 {
            let actor = tl.advance();
            assert!(actor.is_sentinel());
            tl.reset(actor);
        }
    }

    #[test]
    fn duplicate_and_sentinel_inserts_are_rejected() {
        let mut tl = timeline();
        assert!(tl.insert(profile(1, 100), false));
        assert!(!tl.insert(profile(1, 50), false));
        assert!(!tl.insert(profile(u32::MAX, 100), false));
        assert_eq!(tl.len(), 1);
    }

    #[test]
    fn removal_mid_battle_keeps_scheduling_consistent() {
        let mut tl = timeline();
        tl.insert(profile(1, 100), false);
        tl.insert(profile(2, 100), false);
        assert!(tl.remove(CombatantId(1)));
        assert!(!tl.remove(CombatantId(1)));
        assert!(!tl.remove(CombatantId::SENTINEL));

        let actor = tl.advance();
        assert_eq!(actor, CombatantId(2));
    }

    #[test]
    fn join_indices_survive_removal() {
        // The counter is monotonic: rejoining after a removal must not reuse
        // an old index, so late joiners still lose exact ties.
        let mut tl = timeline();
        tl.insert(profile(1, 100), false);
        tl.insert(profile(2, 100), false);
        tl.remove(CombatantId(1));
        tl.insert(profile(3, 100), false);

        let e2 = tl.get(CombatantId(2)).unwrap().join_index();
        let e3 = tl.get(CombatantId(3)).unwrap().join_index();
        assert!(e3 > e2);
        // Equal distance and speed: the earlier joiner wins the tie.
        assert_eq!(tl.advance(), CombatantId(2));
    }

    #[test]
    fn sentinel_reschedules_behind_furthest_combatant() {
        let mut tl = timeline();
        tl.insert(profile(1, 100), false);
        tl.insert(profile(2, 40), false);

        // Run until the sentinel acts, then reset it and check placement.
        loop {
            let actor = tl.advance();
            tl.reset(actor);
            if actor.is_sentinel() {
                break;
            }
        }
        let sentinel = tl.get(CombatantId::SENTINEL).unwrap();
        let furthest = tl
            .get(CombatantId(1))
            .unwrap()
            .distance()
            .max(tl.get(CombatantId(2)).unwrap().distance());
        assert!(sentinel.distance() > furthest);
        // Speed copied from the slowest living combatant.
        assert_eq!(sentinel.profile().speed, 40);
    }
}
