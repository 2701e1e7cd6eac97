//! Timeline participant data.

use core::fmt;

/// Identifies a combatant on the timeline.
///
/// The engine never creates combatants itself; ids are handed in by whatever
/// owns the roster. Only [`CombatantId::SENTINEL`] is reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// The synthetic round-boundary participant.
    pub const SENTINEL: CombatantId = CombatantId(u32::MAX);

    pub fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            write!(f, "sentinel")
        } else {
            write!(f, "combatant#{}", self.0)
        }
    }
}

/// Team tag carried for observers. Opaque to the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamId(pub u16);

/// Portrait handle carried for observers. Opaque to the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortraitId(pub u16);

/// Everything external code supplies when a combatant joins battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantProfile {
    pub id: CombatantId,
    /// Decay rate numerator; 0 means the combatant never advances.
    pub speed: u32,
    /// Seed distance used when joining with `use_initiative = true`.
    pub initiative: i32,
    pub team: TeamId,
    pub portrait: PortraitId,
}

impl CombatantProfile {
    pub fn new(id: CombatantId, speed: u32, initiative: i32) -> Self {
        Self {
            id,
            speed,
            initiative,
            team: TeamId::default(),
            portrait: PortraitId::default(),
        }
    }

    pub fn with_team(mut self, team: TeamId) -> Self {
        self.team = team;
        self
    }

    pub fn with_portrait(mut self, portrait: PortraitId) -> Self {
        self.portrait = portrait;
        self
    }
}

/// A scheduled participant: profile plus the mutable scheduling state the
/// timeline maintains for it.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEntity {
    pub(crate) profile: CombatantProfile,
    /// Remaining "distance to act"; reaches 0 when the entity is up.
    pub(crate) distance: f64,
    /// Insertion sequence, unique per real participant. The sentinel carries
    /// -1 so it wins exact turn-order ties against any real participant.
    pub(crate) join_index: i64,
}

impl TimelineEntity {
    pub(crate) fn new(profile: CombatantProfile, distance: f64, join_index: i64) -> Self {
        Self {
            profile,
            distance,
            join_index,
        }
    }

    pub fn id(&self) -> CombatantId {
        self.profile.id
    }

    pub fn profile(&self) -> &CombatantProfile {
        &self.profile
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn join_index(&self) -> i64 {
        self.join_index
    }

    pub fn is_sentinel(&self) -> bool {
        self.join_index < 0
    }

    /// Distance lost per unit of clock advance.
    pub fn decay_rate(&self) -> f64 {
        f64::from(self.profile.speed) / 100.0
    }

    /// Clock units until this entity acts, or `None` for zero-speed entities,
    /// which are excluded from ordering instead of compared numerically.
    pub fn turn_order(&self) -> Option<f64> {
        if self.profile.speed == 0 {
            None
        } else {
            Some(self.distance / self.decay_rate())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_order_scales_with_speed() {
        let fast = TimelineEntity::new(CombatantProfile::new(CombatantId(1), 100, 0), 100.0, 0);
        let slow = TimelineEntity::new(CombatantProfile::new(CombatantId(2), 50, 0), 100.0, 1);

        assert_eq!(fast.turn_order(), Some(100.0));
        assert_eq!(slow.turn_order(), Some(200.0));
    }

    #[test]
    fn zero_speed_has_no_turn_order() {
        let stuck = TimelineEntity::new(CombatantProfile::new(CombatantId(3), 0, 0), 100.0, 0);
        assert_eq!(stuck.turn_order(), None);
        assert_eq!(stuck.decay_rate(), 0.0);
    }
}
