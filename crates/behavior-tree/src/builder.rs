//! Builder utilities for ergonomic behavior tree construction.
//!
//! This module provides helper functions to reduce boilerplate when building
//! behavior trees. Instead of writing verbose
//! `Box::new(Sequencer::with_children(vec![...]))`, you can use shorter
//! functions like `sequencer(vec![...])`.

use crate::{Action, Behavior, Condition, NodeCore, Parallel, Selector, Sequencer};

/// Creates a sequencer node.
///
/// Shorthand for `Box::new(Sequencer::with_children(children))`.
#[inline]
pub fn sequencer<C: 'static>(children: Vec<Box<dyn Behavior<C>>>) -> Box<dyn Behavior<C>> {
    Box::new(Sequencer::with_children(children))
}

/// Creates a selector node.
///
/// Shorthand for `Box::new(Selector::with_children(children))`.
#[inline]
pub fn selector<C: 'static>(children: Vec<Box<dyn Behavior<C>>>) -> Box<dyn Behavior<C>> {
    Box::new(Selector::with_children(children))
}

/// Creates a parallel node that succeeds once `requirement` children succeed.
#[inline]
pub fn parallel<C: 'static>(
    requirement: i32,
    children: Vec<Box<dyn Behavior<C>>>,
) -> Box<dyn Behavior<C>> {
    Box::new(Parallel::with_children(requirement, children))
}

/// Creates an action leaf.
#[inline]
pub fn action<C, F>(action: F) -> Box<dyn Behavior<C>>
where
    C: 'static,
    F: FnMut(&mut NodeCore, &mut C, f64) + 'static,
{
    Box::new(Action::new(action))
}

/// Creates a condition leaf.
#[inline]
pub fn condition<C, F>(predicate: F) -> Box<dyn Behavior<C>>
where
    C: 'static,
    F: Fn(&C) -> bool + 'static,
{
    Box::new(Condition::new(predicate))
}
