//! Cooperative, tick-driven coroutines.
//!
//! A coroutine is a [`Task`] over a [`Steps`] sequence of yield points. The
//! host calls [`Scheduler::tick`] once per frame; each tick resumes every
//! running task up to its next yield point. Yielding another task parks the
//! outer one until the inner task is done, which is how timed waits
//! ([`wait_for_seconds`]) and condition waits ([`wait_until`]) compose.
//!
//! - **Single-threaded**: tasks are `Rc` handles; no locks, no threads
//! - **Explicit instances**: schedulers are constructed and passed around,
//!   never global
//! - **Soft cancellation**: [`Task::stop`] prevents future work and nothing else
//!
//! # Example
//!
//! ```
//! use coroutine::{Scheduler, Steps, Task, Yield, wait_for_seconds};
//!
//! let scheduler = Scheduler::new();
//! let task = scheduler.start_coroutine(Task::new(Steps::new(vec![
//!     Yield::from(wait_for_seconds(1.0)),
//!     Yield::Empty,
//! ])));
//!
//! scheduler.tick(0.5);
//! scheduler.tick(0.5);
//! assert!(!task.is_done());
//! scheduler.tick(0.1);
//! scheduler.tick(0.1);
//! assert!(task.is_done());
//! ```

pub mod config;
pub mod launcher;
pub mod scheduler;
pub mod steps;
pub mod task;
pub mod wait;

pub use config::{ProcessMode, SchedulerConfig};
pub use launcher::Launcher;
pub use scheduler::{LaunchInfo, Scheduler};
pub use steps::{Steps, Yield};
pub use task::{Task, TaskId, TaskKind};
pub use wait::{wait_for_seconds, wait_until, wait_while};
