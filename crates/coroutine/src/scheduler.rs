//! Task container driven once per host tick.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{SchedulerConfig, Task, TaskId};

/// Snapshot of a scheduler's bookkeeping, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchInfo {
    /// Tasks currently held.
    pub total: usize,
    /// Held tasks that are running.
    pub running: usize,
    /// Held tasks that are done but not purged yet.
    pub done: usize,
    /// Tasks purged as done over the scheduler's lifetime.
    pub kills: u64,
}

impl fmt::Display for LaunchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coroutine Launch Info: Total: {}, Running: {}, Done: {}, Kill: {}",
            self.total, self.running, self.done, self.kills
        )
    }
}

struct Registry {
    tasks: IndexMap<TaskId, Task>,
    auto_clean: bool,
    kills: u64,
}

/// A set of tasks stepped together.
///
/// `Scheduler` is a shared handle: clones refer to the same task set, so step
/// code can capture one and start or stop coroutines while a tick is in
/// progress. Tasks are unique by identity; adding a task twice is a no-op.
///
/// # Tick
///
/// 1. With auto-clean on, finished tasks are purged.
/// 2. The remaining tasks are snapshotted and stepped once each.
///
/// Tasks added during a tick are first stepped on the next one. Tasks removed
/// during a tick are not stepped for the rest of it. No ordering between
/// tasks is promised. A panic inside step code propagates to the caller of
/// [`tick`](Scheduler::tick) and leaves the remaining tasks unstepped.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<Registry>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(&SchedulerConfig::default())
    }

    pub fn with_config(config: &SchedulerConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry {
                tasks: IndexMap::new(),
                auto_clean: config.auto_clean,
                kills: 0,
            })),
        }
    }

    /// Adds `task`, returning `false` if it was already held.
    pub fn add(&self, task: &Task) -> bool {
        let mut registry = self.inner.borrow_mut();
        if registry.tasks.contains_key(&task.id()) {
            return false;
        }
        registry.tasks.insert(task.id(), task.clone());
        trace!(task = %task.id(), "coroutine added");
        true
    }

    /// Removes `task`, returning `false` if it was not held.
    pub fn remove(&self, task: &Task) -> bool {
        self.inner
            .borrow_mut()
            .tasks
            .shift_remove(&task.id())
            .is_some()
    }

    pub fn contains(&self, task: &Task) -> bool {
        self.inner.borrow().tasks.contains_key(&task.id())
    }

    /// Adds `task` if needed and starts it. Returns the task for later control.
    pub fn start_coroutine(&self, task: Task) -> Task {
        self.add(&task);
        task.start();
        task
    }

    /// Stops the held task with the same identity as `task`.
    ///
    /// Does nothing if the scheduler does not hold it.
    pub fn stop_coroutine(&self, task: &Task) {
        let tracked = self.inner.borrow().tasks.get(&task.id()).cloned();
        if let Some(tracked) = tracked {
            tracked.stop();
        }
    }

    /// Removes finished tasks, or every task when `all` is set.
    ///
    /// Only finished tasks count towards [`kill_count`](Scheduler::kill_count).
    /// Returns the number of tasks removed.
    pub fn clean_done(&self, all: bool) -> usize {
        if all {
            let mut registry = self.inner.borrow_mut();
            let removed = registry.tasks.len();
            registry.tasks.clear();
            debug!(removed, "cleared all coroutines");
            return removed;
        }

        // Done checks may run user predicates; keep the registry unborrowed.
        let finished: Vec<TaskId> = self
            .tasks()
            .into_iter()
            .filter(Task::is_done)
            .map(|task| task.id())
            .collect();
        if finished.is_empty() {
            return 0;
        }

        let mut registry = self.inner.borrow_mut();
        let mut removed = 0;
        for id in &finished {
            if registry.tasks.shift_remove(id).is_some() {
                removed += 1;
            }
        }
        registry.kills += removed as u64;
        debug!(removed, kills = registry.kills, "cleaned finished coroutines");
        removed
    }

    /// Steps every held task once with `delta` seconds.
    pub fn tick(&self, delta: f64) {
        if self.auto_clean() {
            self.clean_done(false);
        }

        for task in self.tasks() {
            if self.contains(&task) {
                task.step(delta);
            }
        }
    }

    pub fn start_all(&self) {
        for task in self.tasks() {
            task.start();
        }
    }

    pub fn stop_all(&self) {
        for task in self.tasks() {
            task.stop();
        }
    }

    /// Snapshot of the held tasks, in insertion order.
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.borrow().tasks.values().cloned().collect()
    }

    pub fn info(&self) -> LaunchInfo {
        let tasks = self.tasks();
        LaunchInfo {
            total: tasks.len(),
            running: tasks.iter().filter(|task| task.is_running()).count(),
            done: tasks.iter().filter(|task| task.is_done()).count(),
            kills: self.kill_count(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().tasks.is_empty()
    }

    pub fn auto_clean(&self) -> bool {
        self.inner.borrow().auto_clean
    }

    pub fn set_auto_clean(&self, auto_clean: bool) {
        self.inner.borrow_mut().auto_clean = auto_clean;
    }

    /// Number of finished tasks purged so far.
    pub fn kill_count(&self) -> u64 {
        self.inner.borrow().kills
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(registry) => f
                .debug_struct("Scheduler")
                .field("tasks", &registry.tasks.len())
                .field("auto_clean", &registry.auto_clean)
                .field("kills", &registry.kills)
                .finish(),
            Err(_) => f.debug_struct("Scheduler").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Steps, TaskKind, Yield, wait_for_seconds, wait_until};

    fn markers(count: usize) -> Task {
        Task::new(Steps::new((0..count).map(|_| Yield::Marker)))
    }

    #[test]
    fn add_is_idempotent() {
        let scheduler = Scheduler::new();
        let task = markers(1);

        assert!(scheduler.add(&task));
        assert!(!scheduler.add(&task));
        assert!(!scheduler.add(&task.clone()));
        assert_eq!(scheduler.len(), 1);

        assert!(scheduler.remove(&task));
        assert!(!scheduler.remove(&task));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn start_coroutine_adds_and_starts() {
        let scheduler = Scheduler::new();
        let task = Task::with_autostart(Steps::empty(), false);

        let handle = scheduler.start_coroutine(task.clone());
        assert!(handle.ptr_eq(&task));
        assert!(scheduler.contains(&task));
        assert!(task.is_running());
    }

    #[test]
    fn stop_coroutine_ignores_untracked_tasks() {
        let scheduler = Scheduler::new();
        let tracked = scheduler.start_coroutine(markers(3));
        let stranger = markers(3);

        scheduler.stop_coroutine(&stranger);
        assert!(!stranger.is_done());

        scheduler.stop_coroutine(&tracked);
        assert!(tracked.is_done());
    }

    #[test]
    fn auto_clean_purges_finished_tasks_before_stepping() {
        let scheduler = Scheduler::new();
        let short = scheduler.start_coroutine(Task::new(Steps::empty()));
        let long = scheduler.start_coroutine(markers(5));

        scheduler.tick(0.1);
        assert!(short.is_done());
        assert!(scheduler.contains(&short));

        scheduler.tick(0.1);
        assert!(!scheduler.contains(&short));
        assert!(scheduler.contains(&long));
        assert_eq!(scheduler.kill_count(), 1);
    }

    #[test]
    fn without_auto_clean_done_tasks_stay() {
        let scheduler = Scheduler::with_config(&SchedulerConfig::new(
            false,
            crate::ProcessMode::Idle,
        ));
        let task = scheduler.start_coroutine(Task::new(Steps::empty()));

        scheduler.tick(0.1);
        scheduler.tick(0.1);
        assert!(scheduler.contains(&task));
        assert_eq!(scheduler.kill_count(), 0);

        assert_eq!(scheduler.clean_done(false), 1);
        assert_eq!(scheduler.kill_count(), 1);
    }

    #[test]
    fn clean_all_removes_running_tasks_without_counting_kills() {
        let scheduler = Scheduler::new();
        scheduler.start_coroutine(markers(5));
        scheduler.start_coroutine(markers(5));

        assert_eq!(scheduler.clean_done(true), 2);
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.kill_count(), 0);
    }

    #[test]
    fn start_all_and_stop_all() {
        let scheduler = Scheduler::new();
        let a = Task::with_autostart(Steps::empty(), false);
        let b = Task::with_autostart(Steps::empty(), false);
        scheduler.add(&a);
        scheduler.add(&b);

        scheduler.start_all();
        assert!(a.is_running() && b.is_running());

        scheduler.stop_all();
        assert!(a.is_done() && b.is_done());
    }

    #[test]
    fn step_code_can_start_coroutines_mid_tick() {
        let scheduler = Scheduler::new();
        let spawner = scheduler.clone();
        let mut spawned = false;
        scheduler.start_coroutine(Task::new(Steps::from_fn(move || {
            if !spawned {
                spawned = true;
                spawner.start_coroutine(wait_for_seconds(1.0));
            }
            Some(Yield::Empty)
        })));

        scheduler.tick(0.1);
        assert_eq!(scheduler.len(), 2);

        // The timer was added mid-tick and has not been stepped yet.
        let timer = scheduler.tasks()[1].clone();
        scheduler.tick(0.5);
        scheduler.tick(0.5);
        assert!(timer.is_done());
    }

    #[test]
    fn task_removed_mid_tick_is_not_stepped() {
        let scheduler = Scheduler::new();
        let victim = markers(1);
        let remover = scheduler.clone();
        let target = victim.clone();
        scheduler.start_coroutine(Task::new(Steps::from_fn(move || {
            remover.remove(&target);
            Some(Yield::Empty)
        })));
        scheduler.start_coroutine(victim.clone());

        scheduler.tick(0.1);
        assert!(!scheduler.contains(&victim));
        // Never stepped: still before its first yield point.
        victim.step(0.1);
        victim.step(0.1);
        assert!(victim.is_done());
    }

    #[test]
    fn tick_polls_predicates_that_read_scheduler_info() {
        let scheduler = Scheduler::new();
        let observer = scheduler.clone();
        let gate = scheduler.start_coroutine(wait_until(move || observer.info().running == 1));

        scheduler.tick(0.1);
        scheduler.tick(0.1);

        assert!(!scheduler.contains(&gate));
        assert_eq!(scheduler.kill_count(), 1);
    }

    #[test]
    fn clean_done_polls_predicates_that_list_tasks() {
        let scheduler = Scheduler::new();
        scheduler.set_auto_clean(false);
        let observer = scheduler.clone();
        let worker = scheduler.start_coroutine(markers(1));
        let gate = scheduler.start_coroutine(wait_until(move || {
            observer
                .tasks()
                .iter()
                .filter(|task| task.kind() == TaskKind::Steps)
                .all(Task::is_done)
        }));

        assert_eq!(scheduler.clean_done(false), 0);

        scheduler.tick(0.1);
        scheduler.tick(0.1);
        assert!(worker.is_done());
        assert!(gate.is_done());

        assert_eq!(scheduler.clean_done(false), 2);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn info_reports_counts() {
        let scheduler = Scheduler::new();
        scheduler.start_coroutine(markers(5));
        let paused = scheduler.start_coroutine(markers(5));
        paused.pause();
        let finished = scheduler.start_coroutine(markers(5));
        finished.stop();

        let info = scheduler.info();
        assert_eq!(
            info,
            LaunchInfo {
                total: 3,
                running: 1,
                done: 1,
                kills: 0,
            }
        );
        assert_eq!(
            info.to_string(),
            "Coroutine Launch Info: Total: 3, Running: 1, Done: 1, Kill: 0"
        );
    }
}
