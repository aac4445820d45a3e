//! Status carried by behavior nodes.

/// The state of a behavior node.
///
/// # Tick Semantics
///
/// Frame-driven trees do not always finish within one tick:
/// - Conditions resolve immediately to `Success` or `Failure`
/// - Actions may report `Running` and expect to be ticked again next frame
///
/// `Ready` and `Invalid` are never produced by a tick. `Ready` is the reset
/// state, and `Invalid` is a standing flag set from outside to freeze a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    /// Freshly created, or reset by [`Behavior::ready`](crate::Behavior::ready).
    #[default]
    Ready,

    /// Disabled. `tick` becomes a no-op until the state is changed again.
    Invalid,

    /// The node completed successfully.
    ///
    /// For conditions: the condition held.
    /// For actions: the work finished.
    Success,

    /// The node failed.
    ///
    /// For conditions: the condition did not hold.
    /// For actions: the work could not be done.
    Failure,

    /// The node is still working and must be ticked again.
    Running,
}

impl Status {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }
}
