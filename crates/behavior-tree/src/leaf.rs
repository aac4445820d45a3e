//! Leaf nodes built from closures.
//!
//! [`Action`] and [`Condition`] carry their whole behavior as a closure, so
//! small trees can be assembled without declaring a type per node. The
//! context is passed in on every call rather than captured.

use crate::{Behavior, NodeCore, Status};

type ActionFn<C> = Box<dyn FnMut(&mut NodeCore, &mut C, f64)>;
type PredicateFn<C> = Box<dyn Fn(&C) -> bool>;

/// Leaf that hands itself to a closure each tick.
///
/// The closure receives the node's [`NodeCore`] (already `Running`), the
/// context and the frame delta. It is responsible for setting the terminal
/// state; leaving it untouched keeps the action `Running`.
///
/// # Example
///
/// ```
/// use behavior_tree::{Action, Behavior, Status};
///
/// let mut wait = Action::new(|node, elapsed: &mut f64, delta| {
///     *elapsed += delta;
///     if *elapsed >= 1.0 {
///         node.set_state(Status::Success);
///     }
/// });
///
/// let mut elapsed = 0.0;
/// wait.tick(&mut elapsed, 0.6);
/// assert_eq!(wait.state(), Status::Running);
/// wait.tick(&mut elapsed, 0.6);
/// assert_eq!(wait.state(), Status::Success);
/// ```
pub struct Action<C> {
    core: NodeCore,
    action: ActionFn<C>,
}

impl<C> Action<C> {
    pub fn new<F>(action: F) -> Self
    where
        F: FnMut(&mut NodeCore, &mut C, f64) + 'static,
    {
        Self {
            core: NodeCore::new(),
            action: Box::new(action),
        }
    }
}

impl<C> Behavior<C> for Action<C> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn process(&mut self, ctx: &mut C, delta: f64) {
        (self.action)(&mut self.core, ctx, delta);
    }
}

/// Leaf that maps a predicate to `Success` or `Failure`. Never `Running`.
pub struct Condition<C> {
    core: NodeCore,
    predicate: PredicateFn<C>,
}

impl<C> Condition<C> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        Self {
            core: NodeCore::new(),
            predicate: Box::new(predicate),
        }
    }
}

impl<C> Behavior<C> for Condition<C> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn process(&mut self, ctx: &mut C, _delta: f64) {
        let state = if (self.predicate)(ctx) {
            Status::Success
        } else {
            Status::Failure
        };
        self.core.set_state(state);
    }
}
