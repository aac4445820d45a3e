//! Coroutine tasks.
//!
//! A [`Task`] is a shared handle to one coroutine: either a [`Steps`]
//! sequence or one of the wait leaves from [`crate::wait`]. Handles are cheap
//! to clone and compare by identity, so the same task can be held by a
//! scheduler, by the code that started it and by an outer task waiting on it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::{Steps, Yield};

/// Process-unique identity of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// What a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    Steps,
    Timer,
    Condition,
}

pub(crate) enum Body {
    Steps(Sequence),
    Timer {
        duration: f64,
        elapsed: f64,
    },
    Condition {
        /// `None` while the predicate is being polled.
        predicate: Option<Box<dyn FnMut() -> bool>>,
        expected: bool,
    },
}

pub(crate) struct Sequence {
    /// `None` while the sequence is being resumed, and after it finished.
    steps: Option<Steps>,
    cursor: Cursor,
}

enum Cursor {
    /// Before the first yield point.
    Unstarted,
    At(Yield),
    Finished,
}

struct Inner {
    running: bool,
    done: bool,
    body: Body,
}

enum Next {
    Arrive,
    Advance,
    Await(Task),
}

/// Shared handle to a coroutine.
///
/// # Stepping
///
/// [`step`](Task::step) does nothing unless the task is running and not done.
/// Otherwise:
/// - Before the first yield point, the sequence is resumed up to its first
///   yield. A nested task found there is stepped in the same call.
/// - Parked on a nested task that is done: the sequence resumes to its next
///   yield point.
/// - Parked on a nested task that is not done: the nested task is stepped and
///   the outer sequence stays where it is.
/// - Parked on a plain yield: the sequence resumes to its next yield point.
///
/// Running out of yield points is the only way a sequence finishes on its
/// own; [`stop`](Task::stop) finishes it from outside.
///
/// Step code runs with no borrow of the task held, so it may start, stop or
/// inspect any task, itself included. A task must not yield itself.
#[derive(Clone)]
pub struct Task {
    id: TaskId,
    inner: Rc<RefCell<Inner>>,
}

impl Task {
    /// Creates a running task over `steps`.
    pub fn new(steps: Steps) -> Self {
        Self::with_autostart(steps, true)
    }

    /// Creates a task over `steps`, paused unless `autostart` is set.
    pub fn with_autostart(steps: Steps, autostart: bool) -> Self {
        Self::from_body(
            Body::Steps(Sequence {
                steps: Some(steps),
                cursor: Cursor::Unstarted,
            }),
            autostart,
        )
    }

    pub(crate) fn from_body(body: Body, running: bool) -> Self {
        Self {
            id: TaskId::next(),
            inner: Rc::new(RefCell::new(Inner {
                running,
                done: false,
                body,
            })),
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn kind(&self) -> TaskKind {
        match self.inner.borrow().body {
            Body::Steps(_) => TaskKind::Steps,
            Body::Timer { .. } => TaskKind::Timer,
            Body::Condition { .. } => TaskKind::Condition,
        }
    }

    /// Returns `true` if both handles refer to the same task.
    #[inline]
    pub fn ptr_eq(&self, other: &Task) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Makes the task steppable again. Has no effect once it is done.
    pub fn start(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.running = !inner.done;
    }

    pub fn pause(&self) {
        self.inner.borrow_mut().running = false;
    }

    /// Finishes the task. The sequence is never resumed again.
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.done = true;
        inner.running = false;
    }

    pub fn is_running(&self) -> bool {
        let inner = self.inner.borrow();
        inner.running && !inner.done
    }

    /// Returns `true` once the task has finished.
    ///
    /// Timers report done as soon as the elapsed time reaches their duration.
    /// Condition waits evaluate their predicate on every call, with no borrow
    /// of the task held. A predicate that asks its own task whether it is
    /// done sees `false`.
    pub fn is_done(&self) -> bool {
        let (mut predicate, expected) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if inner.done {
                return true;
            }

            match &mut inner.body {
                Body::Steps(_) => return false,
                Body::Timer { duration, elapsed } => return *elapsed >= *duration,
                Body::Condition {
                    predicate,
                    expected,
                } => match predicate.take() {
                    Some(predicate) => (predicate, *expected),
                    // Already being polled further up the stack.
                    None => return false,
                },
            }
        };

        let holds = predicate() == expected;

        if let Body::Condition { predicate: slot, .. } = &mut self.inner.borrow_mut().body {
            *slot = Some(predicate);
        }
        holds
    }

    /// Advances the task by one tick of `delta` seconds.
    pub fn step(&self, delta: f64) {
        let next = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if !inner.running || inner.done {
                return;
            }

            match &mut inner.body {
                Body::Timer { duration, elapsed } => {
                    *elapsed += delta;
                    if *elapsed >= *duration {
                        inner.running = false;
                        inner.done = true;
                    }
                    return;
                }
                // Polled by `is_done`; nothing to do per tick.
                Body::Condition { .. } => return,
                Body::Steps(sequence) => match &sequence.cursor {
                    Cursor::Unstarted => Next::Arrive,
                    Cursor::At(Yield::Nested(task)) => Next::Await(task.clone()),
                    Cursor::At(_) => Next::Advance,
                    Cursor::Finished => return,
                },
            }
        };

        match next {
            Next::Arrive => {
                self.advance();
                if let Some(task) = self.awaited() {
                    task.step(delta);
                }
            }
            Next::Advance => self.advance(),
            Next::Await(task) => {
                if task.is_done() {
                    self.advance();
                } else {
                    task.step(delta);
                }
            }
        }
    }

    /// Resumes the sequence to its next yield point, finishing the task when
    /// there is none.
    fn advance(&self) {
        let taken = match &mut self.inner.borrow_mut().body {
            Body::Steps(sequence) => sequence.steps.take(),
            _ => None,
        };
        // Already being resumed further up the stack.
        let Some(mut steps) = taken else {
            return;
        };

        let next = steps.next();

        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        if let Body::Steps(sequence) = &mut inner.body {
            match next {
                Some(value) => {
                    sequence.steps = Some(steps);
                    sequence.cursor = Cursor::At(value);
                }
                None => {
                    sequence.cursor = Cursor::Finished;
                    inner.running = false;
                    inner.done = true;
                    trace!(task = %self.id, "coroutine finished");
                }
            }
        }
    }

    /// The nested task the sequence is currently parked on, if any.
    fn awaited(&self) -> Option<Task> {
        match &self.inner.borrow().body {
            Body::Steps(Sequence {
                cursor: Cursor::At(Yield::Nested(task)),
                ..
            }) => Some(task.clone()),
            _ => None,
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl std::hash::Hash for Task {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Collects yield points eagerly into a running task.
impl FromIterator<Yield> for Task {
    fn from_iter<I: IntoIterator<Item = Yield>>(iter: I) -> Self {
        Task::new(Steps::new(iter.into_iter().collect::<Vec<_>>()))
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("Task")
                .field("id", &self.id)
                .field("running", &inner.running)
                .field("done", &inner.done)
                .finish_non_exhaustive(),
            Err(_) => f
                .debug_struct("Task")
                .field("id", &self.id)
                .finish_non_exhaustive(),
        }
    }
}
