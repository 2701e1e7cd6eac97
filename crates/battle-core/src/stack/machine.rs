//! The single global LIFO driver for action frames.
//!
//! One machine exists per battle. It is single-threaded, cooperative, and
//! non-preemptive: an external caller pumps [`StackMachine::step`] at its own
//! cadence, and within one call the machine runs whichever frame is on top
//! forward until it completes, suspends, yields, or hits the safety cap.

use tracing::{debug, trace, warn};

use crate::config::BattleConfig;
use crate::error::SubmitError;
use crate::observer::{FrameSummary, ObserverHub};

use super::frame::{ActionFrame, FrameState, Parked, Spawner};

/// What a single external `step()` call accomplished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The stack was empty; nothing to do.
    Idle,
    /// The top frame is parked on a suspend condition.
    Suspended,
    /// Progress was made and control was returned to the driver with work
    /// remaining (suspension-free yield, e.g. a manual-advance frame).
    Yielded,
    /// The stack drained to empty during this call.
    Completed,
    /// The internal iteration cap was hit; the tick was aborted. The next
    /// external tick picks up where this one stopped.
    Overrun,
}

/// Whether the internal loop keeps going or hands control back.
enum Control {
    Continue,
    Return(StepOutcome),
}

/// Owns the global frame stack and drives the top frame's lifecycle.
pub struct StackMachine<C> {
    stack: Vec<ActionFrame<C>>,
    observers: ObserverHub,
    max_steps_per_tick: u32,
}

impl<C> StackMachine<C> {
    pub fn new(config: &BattleConfig, observers: ObserverHub) -> Self {
        Self {
            stack: Vec::new(),
            observers,
            max_steps_per_tick: config.max_steps_per_tick,
        }
    }

    /// Current stack depth (number of active frames).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    /// State of the frame currently on top, if any.
    pub fn top_state(&self) -> Option<FrameState> {
        self.stack.last().map(|f| f.state)
    }

    /// Hands a frame to the machine.
    ///
    /// If the current top frame is mid-execution the new frame becomes its
    /// child and runs before that frame may end; otherwise it is pushed onto
    /// the global stack directly. A frame may be submitted at most once.
    pub fn submit(&mut self, frame: ActionFrame<C>) -> Result<(), SubmitError> {
        if frame.state != FrameState::Created {
            warn!(
                target: "battle_core::stack",
                label = %frame.label,
                state = %frame.state,
                "rejecting double submission"
            );
            return Err(SubmitError::AlreadySubmitted { state: frame.state });
        }

        match self.stack.last_mut() {
            Some(top) if top.state.is_executing() => {
                trace!(
                    target: "battle_core::stack",
                    child = %frame.label,
                    parent = %top.label,
                    "queueing child on executing frame"
                );
                top.children.push_back(frame);
            }
            _ => {
                let mut frame = frame;
                frame.state = FrameState::Stacked;
                trace!(target: "battle_core::stack", label = %frame.label, "frame pushed");
                self.stack.push(frame);
            }
        }
        Ok(())
    }

    /// Drives the top frame forward. The one externally-driven tick.
    ///
    /// Returns control at the first suspension point, when a manual-advance
    /// frame completes a step, when the stack drains, or when the internal
    /// iteration cap is reached.
    pub fn step(&mut self, ctx: &mut C) -> StepOutcome {
        if self.stack.is_empty() {
            warn!(target: "battle_core::stack", "step() on an empty stack is a no-op");
            return StepOutcome::Idle;
        }

        for _ in 0..self.max_steps_per_tick {
            match self.advance_top(ctx) {
                Control::Continue => continue,
                Control::Return(outcome) => return outcome,
            }
        }

        warn!(
            target: "battle_core::stack",
            cap = self.max_steps_per_tick,
            depth = self.stack.len(),
            "step cap reached, aborting tick (is a frame re-submitting itself?)"
        );
        StepOutcome::Overrun
    }

    /// One internal micro-step against the top frame.
    fn advance_top(&mut self, ctx: &mut C) -> Control {
        let Some(depth) = self.stack.len().checked_sub(1) else {
            return Control::Return(StepOutcome::Completed);
        };

        // A parked frame is resumed (or left parked) before anything else.
        if self.stack[depth].parked.is_some() {
            return self.poll_parked(depth, ctx);
        }

        match self.stack[depth].state {
            FrameState::Stacked => {
                let top = &mut self.stack[depth];
                top.state = FrameState::Starting;
                let summary = FrameSummary {
                    label: top.label.clone(),
                    depth,
                };
                debug!(target: "battle_core::stack", label = %summary.label, depth, "frame started");
                self.observers.notify_frame_started(&summary);
                self.stack[depth].state = FrameState::Started;
                Control::Continue
            }
            FrameState::Started => {
                if self.promote_child(depth) {
                    return Control::Continue;
                }
                if let Some(body) = self.stack[depth].body.take() {
                    let mut spawner = Spawner::new();
                    let steps = body(ctx, &mut spawner);
                    self.stack[depth].steps.extend(steps);
                    self.adopt_spawned(depth, spawner);
                }
                self.stack[depth].state = FrameState::Invoking;
                Control::Continue
            }
            FrameState::Invoking => {
                if self.promote_child(depth) {
                    return Control::Continue;
                }
                let Some(mut step) = self.stack[depth].steps.pop_front() else {
                    self.stack[depth].state = FrameState::Invoked;
                    return Control::Continue;
                };

                if let Some(on_enter) = step.on_enter.take() {
                    let mut spawner = Spawner::new();
                    on_enter(ctx, &mut spawner);
                    self.adopt_spawned(depth, spawner);
                }

                if let Some(condition) = step.suspend.take() {
                    // The one true suspension point: park the continuation
                    // and give control back to the driver.
                    self.stack[depth].parked = Some(Parked {
                        condition,
                        on_resume: step.on_resume.take(),
                    });
                    trace!(target: "battle_core::stack", label = %self.stack[depth].label, "step suspended");
                    return Control::Return(StepOutcome::Suspended);
                }

                if let Some(on_resume) = step.on_resume.take() {
                    let mut spawner = Spawner::new();
                    on_resume(ctx, &mut spawner);
                    self.adopt_spawned(depth, spawner);
                }

                if self.stack[depth].auto_advance {
                    Control::Continue
                } else {
                    Control::Return(StepOutcome::Yielded)
                }
            }
            FrameState::Invoked => {
                if self.promote_child(depth) {
                    return Control::Continue;
                }
                let top = &mut self.stack[depth];
                top.state = FrameState::Ending;
                let summary = FrameSummary {
                    label: top.label.clone(),
                    depth,
                };
                debug!(target: "battle_core::stack", label = %summary.label, depth, "frame ended");
                self.observers.notify_frame_ended(&summary);
                self.stack[depth].state = FrameState::Ended;
                Control::Continue
            }
            FrameState::Ended => {
                // Children queued this late are still honored before the pop.
                if self.promote_child(depth) {
                    return Control::Continue;
                }
                let popped = self.stack.pop();
                if let Some(popped) = popped {
                    trace!(target: "battle_core::stack", label = %popped.label, "frame popped");
                }
                if self.stack.is_empty() {
                    Control::Return(StepOutcome::Completed)
                } else {
                    Control::Continue
                }
            }
            state @ (FrameState::Created | FrameState::Starting | FrameState::Ending) => {
                // Transitional states resolve within a single micro-step and
                // Created never reaches the stack; seeing one here is a bug.
                debug_assert!(false, "unexpected frame state {state} on stack");
                warn!(
                    target: "battle_core::stack",
                    state = %state,
                    "unexpected transitional frame state on stack, yielding"
                );
                Control::Return(StepOutcome::Yielded)
            }
        }
    }

    /// Polls the parked condition of the frame at `depth`, resuming the
    /// continuation when satisfied.
    fn poll_parked(&mut self, depth: usize, ctx: &mut C) -> Control {
        let satisfied = match &mut self.stack[depth].parked {
            Some(parked) => parked.condition.poll(ctx),
            None => return Control::Continue,
        };
        if !satisfied {
            return Control::Return(StepOutcome::Suspended);
        }

        let parked = self.stack[depth].parked.take();
        if let Some(parked) = parked
            && let Some(on_resume) = parked.on_resume
        {
            let mut spawner = Spawner::new();
            on_resume(ctx, &mut spawner);
            self.adopt_spawned(depth, spawner);
        }

        if self.stack[depth].auto_advance {
            Control::Continue
        } else {
            Control::Return(StepOutcome::Yielded)
        }
    }

    /// Moves the next queued child of the frame at `depth` onto the stack,
    /// implicitly suspending that frame. Returns false if no child waits.
    fn promote_child(&mut self, depth: usize) -> bool {
        let Some(mut child) = self.stack[depth].children.pop_front() else {
            return false;
        };
        child.state = FrameState::Stacked;
        trace!(
            target: "battle_core::stack",
            child = %child.label,
            parent = %self.stack[depth].label,
            "promoting queued child"
        );
        self.stack.push(child);
        true
    }

    /// Adopts frames spawned from inside a closure as children of the frame
    /// that ran it, in submission order.
    fn adopt_spawned(&mut self, depth: usize, spawner: Spawner<C>) {
        for frame in spawner.drain() {
            if frame.state != FrameState::Created {
                warn!(
                    target: "battle_core::stack",
                    label = %frame.label,
                    "dropping re-spawned frame that was already submitted"
                );
                continue;
            }
            self.stack[depth].children.push_back(frame);
        }
    }
}
