//! Frame-driven behavior tree and state machine toolkit.
//!
//! Trees are evaluated once per frame by the caller. Each tick walks the tree
//! and leaves every visited node in one of `Success`, `Failure` or `Running`;
//! a `Running` subtree expects to be ticked again on the next frame.
//!
//! - **Explicit context**: every call receives the caller's context `C`
//! - **Closure leaves**: [`Action`] and [`Condition`] take their logic as closures
//! - **Single-threaded**: no locks, no background work
//!
//! # Architecture
//!
//! - [`Behavior`]: Core trait for all nodes, with the `ready`/`enter`/`process`/`exit` lifecycle
//! - [`Status`]: Ready, Invalid, Success, Failure or Running
//! - Composite nodes: [`Sequencer`], [`Selector`], [`Parallel`]
//! - Leaf nodes: [`Action`], [`Condition`]
//! - [`StateMachine`]: switches between [`State`]s, including tree roots
//! - [`Blackboard`]: string-keyed shared data for leaves

pub mod behavior;
pub mod blackboard;
pub mod builder;
pub mod composite;
pub mod error;
pub mod leaf;
pub mod state;
pub mod status;

// Re-export core types for ergonomic API
pub use behavior::{Behavior, NodeCore, NodeId};
pub use blackboard::Blackboard;
pub use composite::{ControlNode, Parallel, Resume, Selector, Sequencer};
pub use error::BlackboardError;
pub use leaf::{Action, Condition};
pub use state::{State, StateMachine};
pub use status::Status;
