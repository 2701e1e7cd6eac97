//! Action frames: one schedulable unit of nested game logic.
//!
//! A frame is a single concrete type parameterized by closures rather than an
//! inheritance hierarchy: callers supply a body that produces [`Step`]s, and
//! each step carries `on_enter` / optional suspend / `on_resume` closures.
//! The machine never inspects what the closures do.

use std::collections::VecDeque;

/// Lifecycle states of an [`ActionFrame`], in strict forward order.
///
/// `Starting` and `Ending` are instantaneous: the machine enters and leaves
/// them within a single internal step, firing the matching notification in
/// between. No legal path re-enters an earlier state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameState {
    /// Constructed, not yet handed to the machine.
    Created,
    /// On the global stack, not yet started.
    Stacked,
    /// Transitional: "frame started" notification in flight.
    Starting,
    /// Running; body not yet invoked.
    Started,
    /// Body invoked; steps being executed.
    Invoking,
    /// All steps done; draining remaining children.
    Invoked,
    /// Transitional: "frame ended" notification in flight.
    Ending,
    /// Terminal. Late-queued children are still honored before the pop.
    Ended,
}

impl FrameState {
    /// True while the frame is the one whose closures may be running, i.e.
    /// re-entrant submissions should become its children.
    pub(crate) fn is_executing(self) -> bool {
        matches!(
            self,
            FrameState::Started | FrameState::Invoking | FrameState::Invoked | FrameState::Ended
        )
    }
}

/// Collects frames spawned from inside a running closure.
///
/// Closures cannot touch the machine directly (it is busy driving them), so
/// they submit through this scratch queue instead; the machine drains it as
/// soon as the closure returns and appends everything to the running frame's
/// child queue, preserving submission order.
pub struct Spawner<C> {
    spawned: Vec<ActionFrame<C>>,
}

impl<C> Spawner<C> {
    pub(crate) fn new() -> Self {
        Self {
            spawned: Vec::new(),
        }
    }

    /// Queues a frame as a child of the frame currently executing.
    pub fn submit(&mut self, frame: ActionFrame<C>) {
        self.spawned.push(frame);
    }

    pub(crate) fn drain(self) -> Vec<ActionFrame<C>> {
        self.spawned
    }
}

/// Closure run at a step boundary.
pub type StepFn<C> = Box<dyn FnOnce(&mut C, &mut Spawner<C>) + Send>;

/// Closure that produces a frame's steps when it transitions to `Invoking`.
pub type FrameBody<C> = Box<dyn FnOnce(&mut C, &mut Spawner<C>) -> Vec<Step<C>> + Send>;

/// External predicate polled while a step is suspended.
pub type SuspendPredicate<C> = Box<dyn FnMut(&C) -> bool + Send>;

/// What a suspended step is waiting for.
///
/// These are the only suspension points in the whole machine: everything else
/// inside a tick runs synchronously to completion.
pub enum SuspendCondition<C> {
    /// Resume after this many further external ticks.
    Delay(u32),
    /// Resume once the predicate observes true. Cancellation is cooperative:
    /// an external actor flips whatever the predicate reads.
    Until(SuspendPredicate<C>),
}

impl<C> SuspendCondition<C> {
    /// Builds a predicate condition without the caller boxing by hand.
    pub fn until(predicate: impl FnMut(&C) -> bool + Send + 'static) -> Self {
        SuspendCondition::Until(Box::new(predicate))
    }

    /// Polled once per external tick; true means the step may resume.
    pub(crate) fn poll(&mut self, ctx: &C) -> bool {
        match self {
            SuspendCondition::Delay(remaining) => {
                if *remaining > 0 {
                    *remaining -= 1;
                }
                *remaining == 0
            }
            SuspendCondition::Until(predicate) => predicate(ctx),
        }
    }
}

/// One atomic unit of work inside a frame's body.
pub struct Step<C> {
    pub(crate) on_enter: Option<StepFn<C>>,
    pub(crate) suspend: Option<SuspendCondition<C>>,
    pub(crate) on_resume: Option<StepFn<C>>,
}

impl<C> Step<C> {
    /// A step that just runs a closure, with no suspension.
    pub fn run(on_enter: impl FnOnce(&mut C, &mut Spawner<C>) + Send + 'static) -> Self {
        Self {
            on_enter: Some(Box::new(on_enter)),
            suspend: None,
            on_resume: None,
        }
    }

    /// Attaches a suspend condition; the step parks after `on_enter` and the
    /// machine returns control to the external driver.
    pub fn suspend_on(mut self, condition: SuspendCondition<C>) -> Self {
        self.suspend = Some(condition);
        self
    }

    /// Continuation run when the suspend condition is satisfied (or right
    /// after `on_enter` when there is no suspend).
    pub fn then(mut self, on_resume: impl FnOnce(&mut C, &mut Spawner<C>) + Send + 'static) -> Self {
        self.on_resume = Some(Box::new(on_resume));
        self
    }
}

/// State parked on a frame between `on_enter` and `on_resume`.
pub(crate) struct Parked<C> {
    pub(crate) condition: SuspendCondition<C>,
    pub(crate) on_resume: Option<StepFn<C>>,
}

/// A single unit of cooperative work with a child queue.
///
/// Constructed by a caller, submitted to the
/// [`StackMachine`](crate::stack::StackMachine), advanced by external ticks
/// until `Ended`, then popped. A frame cannot end while any queued child has
/// not itself ended.
pub struct ActionFrame<C> {
    pub(crate) label: String,
    pub(crate) state: FrameState,
    pub(crate) auto_advance: bool,
    pub(crate) body: Option<FrameBody<C>>,
    pub(crate) steps: VecDeque<Step<C>>,
    pub(crate) children: VecDeque<ActionFrame<C>>,
    pub(crate) parked: Option<Parked<C>>,
}

impl<C: 'static> ActionFrame<C> {
    /// A frame whose steps are produced lazily by `body` once it starts.
    pub fn new(
        label: impl Into<String>,
        body: impl FnOnce(&mut C, &mut Spawner<C>) -> Vec<Step<C>> + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            state: FrameState::Created,
            auto_advance: true,
            body: Some(Box::new(body)),
            steps: VecDeque::new(),
            children: VecDeque::new(),
            parked: None,
        }
    }

    /// A frame with a fixed step list known up front.
    pub fn from_steps(label: impl Into<String>, steps: Vec<Step<C>>) -> Self {
        Self::new(label, move |_, _| steps)
    }

    /// An empty frame: starts, runs nothing, ends. Useful as a pure grouping
    /// node for children.
    pub fn empty(label: impl Into<String>) -> Self {
        Self::from_steps(label, Vec::new())
    }

    /// Disables auto-advance: the machine yields control to the external
    /// driver after every completed step instead of looping.
    pub fn manual_advance(mut self) -> Self {
        self.auto_advance = false;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Number of children waiting in this frame's queue.
    pub fn queued_children(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_counts_external_ticks() {
        let mut condition: SuspendCondition<()> = SuspendCondition::Delay(2);
        assert!(!condition.poll(&()));
        assert!(condition.poll(&()));
        // Stays satisfied once elapsed.
        assert!(condition.poll(&()));
    }

    #[test]
    fn zero_delay_is_immediately_satisfied() {
        let mut condition: SuspendCondition<()> = SuspendCondition::Delay(0);
        assert!(condition.poll(&()));
    }

    #[test]
    fn predicate_condition_tracks_context() {
        let mut condition: SuspendCondition<bool> = SuspendCondition::until(|done: &bool| *done);
        assert!(!condition.poll(&false));
        assert!(condition.poll(&true));
    }

    #[test]
    fn fresh_frames_start_created() {
        let frame: ActionFrame<()> = ActionFrame::empty("noop");
        assert_eq!(frame.state(), FrameState::Created);
        assert_eq!(frame.queued_children(), 0);
        assert_eq!(frame.label(), "noop");
    }
}
