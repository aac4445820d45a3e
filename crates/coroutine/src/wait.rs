//! Wait leaves: tasks without a step sequence, meant to be yielded as
//! [`Yield::Nested`](crate::Yield::Nested) from another task.

use crate::Task;
use crate::task::Body;

/// A task that finishes once the deltas it was stepped with add up to
/// `duration` seconds. The boundary is inclusive.
pub fn wait_for_seconds(duration: f64) -> Task {
    Task::from_body(
        Body::Timer {
            duration,
            elapsed: 0.0,
        },
        true,
    )
}

/// A task that is done whenever `predicate` returns `true`.
///
/// The predicate is polled on every [`Task::is_done`] call and never
/// latched, so an outer task only moves on if it observes `true` at the
/// moment it checks.
pub fn wait_until<F>(predicate: F) -> Task
where
    F: FnMut() -> bool + 'static,
{
    Task::from_body(
        Body::Condition {
            predicate: Some(Box::new(predicate)),
            expected: true,
        },
        true,
    )
}

/// A task that is done whenever `predicate` returns `false`.
pub fn wait_while<F>(predicate: F) -> Task
where
    F: FnMut() -> bool + 'static,
{
    Task::from_body(
        Body::Condition {
            predicate: Some(Box::new(predicate)),
            expected: false,
        },
        true,
    )
}
