//! Battle orchestrator: binds the initiative timeline to the stack machine.
//!
//! One [`Battle`] exists per battle instance and owns everything: timeline,
//! machine, observer hub, event bus, and the turn provider. There are no
//! process-wide statics; hosts that run several battles construct several
//! `Battle` values. The host supplies the tick cadence by calling
//! [`Battle::tick`], e.g. once per rendered frame or per debug command.

use std::sync::Arc;

use battle_core::{
    ActionFrame, BattleConfig, CombatantId, CombatantProfile, ObserverHub, StackMachine,
    StepOutcome, Timeline, TimelineEntity,
};
use tracing::{debug, warn};

use crate::error::{Result, RuntimeError};
use crate::events::{BusBridge, Event, EventBus, Topic, TurnEvent};
use crate::provider::TurnProvider;

/// What one orchestrator tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// The combatant whose turn is (or was) in flight this tick. `None` for
    /// sentinel/round-boundary ticks.
    pub actor: Option<CombatantId>,
    /// Outcome of the machine step driven by this tick.
    pub outcome: StepOutcome,
    /// True if the in-flight turn finished during this tick.
    pub turn_finished: bool,
}

/// Owns one battle's scheduling state and drives it turn by turn.
pub struct Battle<C, P> {
    timeline: Timeline,
    machine: StackMachine<C>,
    provider: P,
    bus: EventBus,
    observers: ObserverHub,
    /// Actor whose turn frame is currently on the stack (sentinel included).
    current_actor: Option<CombatantId>,
    rounds_completed: u64,
}

impl<C: 'static, P: TurnProvider<C>> Battle<C, P> {
    pub fn new(config: BattleConfig, provider: P) -> Self {
        let observers = ObserverHub::new();
        let bus = EventBus::new();
        observers.subscribe(Arc::new(BusBridge::new(bus.clone())));

        Self {
            timeline: Timeline::new(config.clone(), observers.clone()),
            machine: StackMachine::new(&config, observers.clone()),
            provider,
            bus,
            observers,
            current_actor: None,
            rounds_completed: 0,
        }
    }

    /// Adds a combatant to the battle. See [`Timeline::insert`].
    pub fn join(&mut self, profile: CombatantProfile, use_initiative: bool) -> bool {
        self.timeline.insert(profile, use_initiative)
    }

    /// Removes a combatant (death, retreat). The turn in flight is not
    /// interrupted; cancellation of its frames is cooperative.
    pub fn leave(&mut self, id: CombatantId) -> bool {
        self.timeline.remove(id)
    }

    /// Drives the battle forward by one external tick.
    ///
    /// When the machine is idle a new turn is opened first: the timeline
    /// advances, the provider builds the actor's turn frame (round
    /// boundaries get an empty frame), and the frame is submitted. Then one
    /// machine step runs. When the stack drains back to empty the turn is
    /// closed: the actor is reset on the timeline and turn/round events are
    /// published.
    pub fn tick(&mut self, ctx: &mut C) -> TickReport {
        if self.machine.is_idle() {
            self.begin_next_turn();
        }

        let actor = self.current_actor;
        let outcome = self.machine.step(ctx);
        let turn_finished = outcome == StepOutcome::Completed;
        if turn_finished {
            self.finish_turn();
        }

        TickReport {
            actor: actor.filter(|a| !a.is_sentinel()),
            outcome,
            turn_finished,
        }
    }

    /// Submits an extra frame mid-turn (reactions, scripted interludes).
    /// Follows stack-machine rules: it becomes a child of the executing
    /// frame, or a root frame if nothing is running.
    pub fn submit(&mut self, frame: ActionFrame<C>) -> Result<()> {
        self.machine.submit(frame)?;
        Ok(())
    }

    /// Read access to a scheduled combatant.
    pub fn combatant(&self, id: CombatantId) -> Result<&TimelineEntity> {
        self.timeline.get(id).ok_or(RuntimeError::UnknownCombatant(id))
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Completed round count (sentinel activations).
    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    /// Subscribes to a bus topic. Any number of listeners may subscribe.
    pub fn subscribe(&self, topic: Topic) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Subscribes to several topics at once, one receiver per topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, tokio::sync::broadcast::Receiver<Event>> {
        self.bus.subscribe_multiple(topics)
    }

    /// The core observer hub, for listeners that want synchronous callbacks
    /// instead of bus messages.
    pub fn observers(&self) -> &ObserverHub {
        &self.observers
    }

    fn begin_next_turn(&mut self) {
        let actor = self.timeline.advance();

        let frame = if actor.is_sentinel() {
            // Round boundary: no provider content, just a uniform lifecycle.
            ActionFrame::empty("round-boundary")
        } else {
            self.bus
                .publish(Event::Turn(TurnEvent::TurnStarted { actor }));
            self.provider.turn_frame(actor, &self.timeline)
        };

        debug!(target: "battle_runtime::battle", actor = %actor, "turn opened");
        if let Err(err) = self.machine.submit(frame) {
            // Unreachable with provider-built frames; degrade to a skipped
            // turn rather than wedging the battle.
            warn!(target: "battle_runtime::battle", actor = %actor, %err, "turn frame rejected");
        }
        self.current_actor = Some(actor);
    }

    fn finish_turn(&mut self) {
        let Some(actor) = self.current_actor.take() else {
            return;
        };
        self.timeline.reset(actor);

        if actor.is_sentinel() {
            self.rounds_completed += 1;
            self.bus.publish(Event::Turn(TurnEvent::RoundEnded {
                round: self.rounds_completed,
            }));
        } else {
            self.bus
                .publish(Event::Turn(TurnEvent::TurnEnded { actor }));
        }
        debug!(target: "battle_runtime::battle", actor = %actor, "turn closed");
    }
}
