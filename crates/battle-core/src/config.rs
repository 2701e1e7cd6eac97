/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Distance a combatant is reset to after finishing a turn, and the
    /// starting distance for combatants that join without an initiative seed.
    pub reset_distance: f64,

    /// Nudge added to the sentinel's recomputed distance so it sorts strictly
    /// after the furthest combatant even on an exact tie. Tunable; the only
    /// guarantee is "strictly after", not the magnitude.
    pub sentinel_epsilon: f64,

    /// Speed assigned to the sentinel when no positive-speed combatant
    /// remains to copy from.
    pub fallback_sentinel_speed: u32,

    /// Upper bound on internal machine iterations per external `step()` call.
    /// Hitting the cap aborts the tick with a diagnostic instead of spinning.
    pub max_steps_per_tick: u32,
}

impl BattleConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_RESET_DISTANCE: f64 = 100.0;
    pub const DEFAULT_SENTINEL_EPSILON: f64 = 0.5;
    pub const DEFAULT_FALLBACK_SENTINEL_SPEED: u32 = 100;
    pub const DEFAULT_MAX_STEPS_PER_TICK: u32 = 100;

    pub fn new() -> Self {
        Self {
            reset_distance: Self::DEFAULT_RESET_DISTANCE,
            sentinel_epsilon: Self::DEFAULT_SENTINEL_EPSILON,
            fallback_sentinel_speed: Self::DEFAULT_FALLBACK_SENTINEL_SPEED,
            max_steps_per_tick: Self::DEFAULT_MAX_STEPS_PER_TICK,
        }
    }

    pub fn with_reset_distance(reset_distance: f64) -> Self {
        Self {
            reset_distance,
            ..Self::new()
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
