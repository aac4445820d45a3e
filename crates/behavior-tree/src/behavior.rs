//! Core behavior trait.
//!
//! This module defines the [`Behavior`] trait, the abstraction every tree
//! node implements, and [`NodeCore`], the bookkeeping each node carries. The
//! trait is generic over a context type `C` (a blackboard, an actor view, ...)
//! that is handed to every call explicitly instead of being captured.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Status;

/// Process-unique identity of a behavior node.
///
/// Parents refer to children, and children to their parent, by id. The id is
/// never reused, so a detached node cannot be mistaken for its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// State shared by every node: identity, current status and parent link.
///
/// `parent` is a non-owning back-link. Ownership always flows top-down
/// through [`ControlNode`](crate::ControlNode) children.
#[derive(Debug)]
pub struct NodeCore {
    id: NodeId,
    state: Status,
    parent: Option<NodeId>,
}

impl NodeCore {
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            state: Status::Ready,
            parent: None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> Status {
        self.state
    }

    #[inline]
    pub fn set_state(&mut self, state: Status) {
        self.state = state;
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

impl Default for NodeCore {
    fn default() -> Self {
        Self::new()
    }
}

/// A behavior tree node driven once per frame.
///
/// Implementors supply [`core`](Behavior::core), [`core_mut`](Behavior::core_mut)
/// and [`process`](Behavior::process); the lifecycle around them is provided.
pub trait Behavior<C> {
    fn core(&self) -> &NodeCore;

    fn core_mut(&mut self) -> &mut NodeCore;

    /// Node-specific work for one tick.
    ///
    /// On entry the node's state is `Running`. Implementations leave the
    /// state at `Success` or `Failure` when they finish, or keep `Running`
    /// to be ticked again.
    fn process(&mut self, ctx: &mut C, delta: f64);

    /// Resets this node and its whole subtree to [`Status::Ready`].
    fn ready(&mut self) {
        self.core_mut().set_state(Status::Ready);
        for child in self.children_mut() {
            child.ready();
        }
    }

    fn enter(&mut self, _ctx: &mut C) {
        self.core_mut().set_state(Status::Running);
    }

    fn exit(&mut self, _ctx: &mut C) {}

    /// Runs `enter`, `process` and `exit` in order.
    ///
    /// Does nothing while the node is [`Status::Invalid`].
    fn tick(&mut self, ctx: &mut C, delta: f64) {
        if self.state() == Status::Invalid {
            return;
        }

        self.enter(ctx);
        self.process(ctx, delta);
        self.exit(ctx);
    }

    /// Direct children, in evaluation order. Leaves have none.
    fn children(&self) -> &[Box<dyn Behavior<C>>] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Behavior<C>>] {
        &mut []
    }

    #[inline]
    fn state(&self) -> Status {
        self.core().state()
    }

    /// Overrides the node's state, e.g. to disable it with [`Status::Invalid`].
    #[inline]
    fn set_state(&mut self, state: Status) {
        self.core_mut().set_state(state);
    }

    #[inline]
    fn id(&self) -> NodeId {
        self.core().id()
    }

    #[inline]
    fn parent(&self) -> Option<NodeId> {
        self.core().parent()
    }

    #[inline]
    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.core_mut().set_parent(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        core: NodeCore,
        result: Status,
        entered: u32,
        processed: u32,
        exited: u32,
    }

    impl Counter {
        fn new(result: Status) -> Self {
            Self {
                core: NodeCore::new(),
                result,
                entered: 0,
                processed: 0,
                exited: 0,
            }
        }
    }

    impl Behavior<Vec<&'static str>> for Counter {
        fn core(&self) -> &NodeCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut NodeCore {
            &mut self.core
        }

        fn enter(&mut self, ctx: &mut Vec<&'static str>) {
            self.entered += 1;
            ctx.push("enter");
            self.core.set_state(Status::Running);
        }

        fn process(&mut self, ctx: &mut Vec<&'static str>, _delta: f64) {
            self.processed += 1;
            ctx.push("process");
            assert_eq!(self.core.state(), Status::Running);
            self.core.set_state(self.result);
        }

        fn exit(&mut self, ctx: &mut Vec<&'static str>) {
            self.exited += 1;
            ctx.push("exit");
        }
    }

    #[test]
    fn tick_brackets_process_with_enter_and_exit() {
        let mut node = Counter::new(Status::Success);
        let mut log = Vec::new();

        node.tick(&mut log, 0.016);

        assert_eq!(log, vec!["enter", "process", "exit"]);
        assert_eq!(node.state(), Status::Success);
    }

    #[test]
    fn invalid_node_is_skipped() {
        let mut node = Counter::new(Status::Success);
        node.set_state(Status::Invalid);
        let mut log = Vec::new();

        node.tick(&mut log, 0.016);
        node.tick(&mut log, 0.016);

        assert!(log.is_empty());
        assert_eq!((node.entered, node.processed, node.exited), (0, 0, 0));
        assert_eq!(node.state(), Status::Invalid);
    }

    #[test]
    fn ready_resets_state() {
        let mut node = Counter::new(Status::Failure);
        node.tick(&mut Vec::new(), 0.0);
        assert_eq!(node.state(), Status::Failure);

        node.ready();
        assert_eq!(node.state(), Status::Ready);
    }

    #[test]
    fn node_ids_are_unique() {
        let a = NodeCore::new();
        let b = NodeCore::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.parent(), None);
    }
}
