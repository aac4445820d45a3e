//! Resumable step sequences.
//!
//! A [`Steps`] value is the body of a coroutine: a lazy, one-shot sequence of
//! [`Yield`] points. Each yield parks the owning task until the next tick
//! (plain yields) or until a nested task finishes ([`Yield::Nested`]).

use std::fmt;
use std::iter;

use crate::Task;

/// A value produced at a yield point.
#[derive(Debug)]
pub enum Yield {
    /// Wait for the next tick.
    Empty,

    /// Wait for the next tick. Distinguishable from [`Yield::Empty`] for step
    /// code that wants to tag its yield points; the scheduler treats both alike.
    Marker,

    /// Wait until the nested task reports done. The nested task is stepped
    /// with the outer task's delta on every tick until then.
    Nested(Task),
}

impl From<Task> for Yield {
    fn from(task: Task) -> Self {
        Yield::Nested(task)
    }
}

/// Owned step sequence of a coroutine.
///
/// Not `Clone`: a sequence is consumed as the coroutine runs, and running it
/// again means building a new one.
pub struct Steps {
    iter: Box<dyn Iterator<Item = Yield>>,
}

impl Steps {
    /// Wraps any iterator of yield points.
    pub fn new<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = Yield>,
        I::IntoIter: 'static,
    {
        Self {
            iter: Box::new(steps.into_iter()),
        }
    }

    /// Builds a sequence from a resumable closure.
    ///
    /// The closure runs the code up to its next yield point and returns the
    /// yielded value, or `None` once the coroutine is finished. Locals that
    /// must survive across yields live in the closure's captured state.
    ///
    /// ```
    /// use coroutine::{Steps, Task, Yield, wait_for_seconds};
    ///
    /// let mut stage = 0;
    /// let task = Task::new(Steps::from_fn(move || {
    ///     stage += 1;
    ///     match stage {
    ///         1 => Some(wait_for_seconds(0.5).into()),
    ///         2 => Some(Yield::Empty),
    ///         _ => None,
    ///     }
    /// }));
    ///
    /// for _ in 0..4 {
    ///     task.step(0.5);
    /// }
    /// assert!(task.is_done());
    /// ```
    pub fn from_fn<F>(resume: F) -> Self
    where
        F: FnMut() -> Option<Yield> + 'static,
    {
        Self::new(iter::from_fn(resume))
    }

    /// A sequence with no yield points. Its task finishes on the first step.
    pub fn empty() -> Self {
        Self::new(iter::empty())
    }
}

impl Iterator for Steps {
    type Item = Yield;

    fn next(&mut self) -> Option<Yield> {
        self.iter.next()
    }
}

impl fmt::Debug for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Steps").finish_non_exhaustive()
    }
}
