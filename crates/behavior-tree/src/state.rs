//! State lifecycle and a single-slot state machine.
//!
//! [`State`] is the contract shared by everything the AI layer can switch
//! between: a behavior tree root, a hand-written state, or another
//! [`StateMachine`]. The machine itself holds exactly one current state and
//! forwards the lifecycle calls to it.

use tracing::trace;

use crate::Behavior;

/// Lifecycle of anything a [`StateMachine`] can hold.
pub trait State<C> {
    fn ready(&mut self) {}

    fn enter(&mut self, _ctx: &mut C) {}

    /// Per-frame work while this state is current.
    fn process(&mut self, ctx: &mut C, delta: f64);

    fn exit(&mut self, _ctx: &mut C) {}
}

/// A boxed behavior tree is a state: processing it ticks the root.
impl<C, B> State<C> for Box<B>
where
    B: Behavior<C> + ?Sized,
{
    fn ready(&mut self) {
        (**self).ready();
    }

    fn enter(&mut self, ctx: &mut C) {
        (**self).enter(ctx);
    }

    fn process(&mut self, ctx: &mut C, delta: f64) {
        (**self).tick(ctx, delta);
    }

    fn exit(&mut self, ctx: &mut C) {
        (**self).exit(ctx);
    }
}

/// Holds one current state and switches between states on request.
///
/// `change_state` must not be called from inside the `enter`/`exit` of a
/// state owned by the same machine; the borrow rules make that impossible
/// without interior mutability.
pub struct StateMachine<C> {
    current: Box<dyn State<C>>,
}

impl<C> StateMachine<C> {
    /// Creates a machine whose current state is `initial`.
    ///
    /// `initial` is not entered; call [`State::enter`] on the machine when
    /// the owner starts driving it.
    pub fn new(initial: Box<dyn State<C>>) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> &dyn State<C> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> &mut dyn State<C> {
        self.current.as_mut()
    }

    /// Exits the current state, installs `target` and enters it.
    ///
    /// Returns the previous state so the caller can keep or reuse it.
    pub fn change_state(&mut self, target: Box<dyn State<C>>, ctx: &mut C) -> Box<dyn State<C>> {
        self.current.exit(ctx);
        let previous = std::mem::replace(&mut self.current, target);
        self.current.enter(ctx);
        trace!("state machine switched state");
        previous
    }
}

impl<C> State<C> for StateMachine<C> {
    fn ready(&mut self) {
        self.current.ready();
    }

    fn enter(&mut self, ctx: &mut C) {
        self.current.enter(ctx);
    }

    fn process(&mut self, ctx: &mut C, delta: f64) {
        self.current.process(ctx, delta);
    }

    fn exit(&mut self, ctx: &mut C) {
        self.current.exit(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{action, condition, sequencer};
    use crate::{NodeCore, Status};

    struct Recording {
        name: &'static str,
    }

    impl State<Vec<String>> for Recording {
        fn ready(&mut self) {}

        fn enter(&mut self, ctx: &mut Vec<String>) {
            ctx.push(format!("{}:enter", self.name));
        }

        fn process(&mut self, ctx: &mut Vec<String>, _delta: f64) {
            ctx.push(format!("{}:process", self.name));
        }

        fn exit(&mut self, ctx: &mut Vec<String>) {
            ctx.push(format!("{}:exit", self.name));
        }
    }

    #[test]
    fn change_state_exits_then_enters() {
        let mut machine = StateMachine::new(Box::new(Recording { name: "idle" }));
        let mut log = Vec::new();

        machine.process(&mut log, 0.1);
        let previous = machine.change_state(Box::new(Recording { name: "chase" }), &mut log);
        machine.process(&mut log, 0.1);

        drop(previous);
        assert_eq!(
            log,
            vec!["idle:process", "idle:exit", "chase:enter", "chase:process"]
        );
    }

    #[test]
    fn nested_machine_forwards_to_inner_state() {
        let inner = StateMachine::new(Box::new(Recording { name: "inner" }));
        let mut outer = StateMachine::new(Box::new(inner));
        let mut log = Vec::new();

        outer.enter(&mut log);
        outer.process(&mut log, 0.1);
        outer.exit(&mut log);

        assert_eq!(log, vec!["inner:enter", "inner:process", "inner:exit"]);
    }

    #[test]
    fn behavior_tree_root_is_ticked_as_a_state() {
        let tree = sequencer(vec![
            condition(|ticks: &u32| *ticks < 10),
            action(|node: &mut NodeCore, ticks: &mut u32, _| {
                *ticks += 1;
                node.set_state(Status::Success);
            }),
        ]);
        let mut machine = StateMachine::new(Box::new(tree));

        let mut ticks = 0u32;
        machine.process(&mut ticks, 0.1);
        machine.process(&mut ticks, 0.1);

        assert_eq!(ticks, 2);
    }
}
