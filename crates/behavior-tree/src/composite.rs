//! Composite behavior nodes.
//!
//! Composite nodes own an ordered list of children and decide how their
//! results combine: [`Sequencer`] (AND logic), [`Selector`] (OR logic) and
//! [`Parallel`] (threshold logic). Children are evaluated strictly left to
//! right; the order is part of the semantics.

use tracing::trace;

use crate::{Behavior, NodeCore, NodeId, Status};

/// Where a [`Sequencer`] or [`Selector`] starts its loop on the next tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resume {
    /// Restart at the first child every tick, re-ticking children that
    /// already succeeded (or failed, for a selector) before the running one.
    #[default]
    FromStart,

    /// Continue at the child that reported `Running` on the previous tick.
    FromRunning,
}

/// Structural operations shared by nodes that own children.
pub trait ControlNode<C>: Behavior<C> {
    /// The owned child list.
    fn child_list(&mut self) -> &mut Vec<Box<dyn Behavior<C>>>;

    /// Called after the child list changed shape.
    fn children_changed(&mut self) {}

    /// Appends `child` and points its parent link at this node.
    fn add_child(&mut self, mut child: Box<dyn Behavior<C>>) {
        child.set_parent(Some(self.id()));
        trace!(node = %self.id(), child = %child.id(), "child attached");
        self.child_list().push(child);
        self.children_changed();
    }

    /// Detaches the direct child with the given id and clears its parent link.
    ///
    /// Returns `None` if no direct child has that id.
    fn remove_child(&mut self, id: NodeId) -> Option<Box<dyn Behavior<C>>> {
        let children = self.child_list();
        let index = children.iter().position(|child| child.id() == id)?;
        let mut child = children.remove(index);
        child.set_parent(None);
        self.children_changed();
        trace!(node = %self.id(), child = %id, "child detached");
        Some(child)
    }

    /// Lists children in evaluation order; with `recursive`, each child is
    /// followed by its own descendants (depth-first, pre-order).
    fn get_children(&self, recursive: bool) -> Vec<&dyn Behavior<C>> {
        let mut nodes = Vec::new();
        collect(self.children(), recursive, &mut nodes);
        nodes
    }
}

fn collect<'a, C>(
    children: &'a [Box<dyn Behavior<C>>],
    recursive: bool,
    out: &mut Vec<&'a dyn Behavior<C>>,
) {
    for child in children {
        out.push(child.as_ref());
        if recursive {
            collect(child.children(), true, out);
        }
    }
}

/// Ticks children in order until one does not succeed.
///
/// # Semantics
///
/// - `Failure` from a child stops the loop; the sequencer fails
/// - `Running` from a child stops the loop; the sequencer keeps running
/// - `Success` moves on to the next child
/// - If every child succeeds (or there are none), the sequencer succeeds
///
/// With the default [`Resume::FromStart`] a running sequencer re-ticks all
/// earlier children on every call before reaching the running one.
pub struct Sequencer<C> {
    core: NodeCore,
    children: Vec<Box<dyn Behavior<C>>>,
    resume: Resume,
    cursor: usize,
}

impl<C> Sequencer<C> {
    pub fn new() -> Self {
        Self::with_children(Vec::new())
    }

    /// Creates a sequencer that adopts `children` in order.
    pub fn with_children(children: Vec<Box<dyn Behavior<C>>>) -> Self {
        let mut sequencer = Self {
            core: NodeCore::new(),
            children: Vec::with_capacity(children.len()),
            resume: Resume::default(),
            cursor: 0,
        };
        for child in children {
            sequencer.add_child(child);
        }
        sequencer
    }

    pub fn resume(mut self, resume: Resume) -> Self {
        self.resume = resume;
        self
    }
}

impl<C> Default for Sequencer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Behavior<C> for Sequencer<C> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn ready(&mut self) {
        self.cursor = 0;
        self.core.set_state(Status::Ready);
        for child in &mut self.children {
            child.ready();
        }
    }

    fn process(&mut self, ctx: &mut C, delta: f64) {
        let start = match self.resume {
            Resume::FromStart => 0,
            Resume::FromRunning => self.cursor,
        };

        for (index, child) in self.children.iter_mut().enumerate().skip(start) {
            child.tick(ctx, delta);

            match child.state() {
                Status::Running => {
                    self.cursor = index;
                    return;
                }
                Status::Failure => {
                    self.cursor = 0;
                    self.core.set_state(Status::Failure);
                    return;
                }
                // Success, or a disabled child that did not run
                _ => continue,
            }
        }

        self.cursor = 0;
        self.core.set_state(Status::Success);
    }

    fn children(&self) -> &[Box<dyn Behavior<C>>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Behavior<C>>] {
        &mut self.children
    }
}

impl<C> ControlNode<C> for Sequencer<C> {
    fn child_list(&mut self) -> &mut Vec<Box<dyn Behavior<C>>> {
        &mut self.children
    }

    fn children_changed(&mut self) {
        self.cursor = 0;
    }
}

/// Ticks children in order until one does not fail.
///
/// # Semantics
///
/// - `Success` from a child stops the loop; the selector succeeds
/// - `Running` from a child stops the loop; the selector keeps running
/// - `Failure` moves on to the next child
/// - If every child fails (or there are none), the selector fails
pub struct Selector<C> {
    core: NodeCore,
    children: Vec<Box<dyn Behavior<C>>>,
    resume: Resume,
    cursor: usize,
}

impl<C> Selector<C> {
    pub fn new() -> Self {
        Self::with_children(Vec::new())
    }

    /// Creates a selector that adopts `children` in order.
    pub fn with_children(children: Vec<Box<dyn Behavior<C>>>) -> Self {
        let mut selector = Self {
            core: NodeCore::new(),
            children: Vec::with_capacity(children.len()),
            resume: Resume::default(),
            cursor: 0,
        };
        for child in children {
            selector.add_child(child);
        }
        selector
    }

    pub fn resume(mut self, resume: Resume) -> Self {
        self.resume = resume;
        self
    }
}

impl<C> Default for Selector<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Behavior<C> for Selector<C> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn ready(&mut self) {
        self.cursor = 0;
        self.core.set_state(Status::Ready);
        for child in &mut self.children {
            child.ready();
        }
    }

    fn process(&mut self, ctx: &mut C, delta: f64) {
        let start = match self.resume {
            Resume::FromStart => 0,
            Resume::FromRunning => self.cursor,
        };

        for (index, child) in self.children.iter_mut().enumerate().skip(start) {
            child.tick(ctx, delta);

            match child.state() {
                Status::Running => {
                    self.cursor = index;
                    return;
                }
                Status::Success => {
                    self.cursor = 0;
                    self.core.set_state(Status::Success);
                    return;
                }
                _ => continue,
            }
        }

        self.cursor = 0;
        self.core.set_state(Status::Failure);
    }

    fn children(&self) -> &[Box<dyn Behavior<C>>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Behavior<C>>] {
        &mut self.children
    }
}

impl<C> ControlNode<C> for Selector<C> {
    fn child_list(&mut self) -> &mut Vec<Box<dyn Behavior<C>>> {
        &mut self.children
    }

    fn children_changed(&mut self) {
        self.cursor = 0;
    }
}

/// Ticks every child on every call and counts successes.
///
/// # Semantics
///
/// - No child succeeded: `Failure`
/// - At least `requirement` children succeeded: `Success`
/// - Otherwise: `Running`
///
/// The zero-success check comes first, so a non-positive `requirement`
/// still fails a tick in which nothing succeeded.
pub struct Parallel<C> {
    core: NodeCore,
    children: Vec<Box<dyn Behavior<C>>>,
    requirement: i32,
}

impl<C> Parallel<C> {
    pub fn new(requirement: i32) -> Self {
        Self::with_children(requirement, Vec::new())
    }

    pub fn with_children(requirement: i32, children: Vec<Box<dyn Behavior<C>>>) -> Self {
        let mut parallel = Self {
            core: NodeCore::new(),
            children: Vec::with_capacity(children.len()),
            requirement,
        };
        for child in children {
            parallel.add_child(child);
        }
        parallel
    }

    #[inline]
    pub fn requirement(&self) -> i32 {
        self.requirement
    }
}

impl<C> Behavior<C> for Parallel<C> {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn process(&mut self, ctx: &mut C, delta: f64) {
        let mut successes: i64 = 0;

        for child in &mut self.children {
            child.tick(ctx, delta);

            if child.state().is_success() {
                successes += 1;
            }
        }

        let state = if successes == 0 {
            Status::Failure
        } else if successes >= i64::from(self.requirement) {
            Status::Success
        } else {
            Status::Running
        };
        self.core.set_state(state);
    }

    fn children(&self) -> &[Box<dyn Behavior<C>>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Behavior<C>>] {
        &mut self.children
    }
}

impl<C> ControlNode<C> for Parallel<C> {
    fn child_list(&mut self) -> &mut Vec<Box<dyn Behavior<C>>> {
        &mut self.children
    }
}
