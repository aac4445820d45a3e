//! A scheduler bound to one host frame phase.
//!
//! Hosts usually call into the coroutine layer from two places: the
//! variable-rate frame update and the fixed-rate physics update. A
//! [`Launcher`] is handed both calls and only ticks its scheduler from the
//! one matching its [`ProcessMode`].

use std::cell::Cell;
use std::rc::Rc;

use crate::{LaunchInfo, ProcessMode, Scheduler, SchedulerConfig, Task};

/// Shared handle: clones drive the same scheduler and follow the same mode.
#[derive(Debug, Clone)]
pub struct Launcher {
    scheduler: Scheduler,
    mode: Rc<Cell<ProcessMode>>,
}

impl Launcher {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            scheduler: Scheduler::with_config(&config),
            mode: Rc::new(Cell::new(config.mode)),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn mode(&self) -> ProcessMode {
        self.mode.get()
    }

    pub fn set_mode(&self, mode: ProcessMode) {
        self.mode.set(mode);
    }

    /// Frame update hook. Ticks only in [`ProcessMode::Idle`].
    pub fn process(&self, delta: f64) {
        if self.mode() == ProcessMode::Idle {
            self.scheduler.tick(delta);
        }
    }

    /// Physics update hook. Ticks only in [`ProcessMode::Physics`].
    pub fn physics_process(&self, delta: f64) {
        if self.mode() == ProcessMode::Physics {
            self.scheduler.tick(delta);
        }
    }

    pub fn start_coroutine(&self, task: Task) -> Task {
        self.scheduler.start_coroutine(task)
    }

    pub fn stop_coroutine(&self, task: &Task) {
        self.scheduler.stop_coroutine(task);
    }

    pub fn start_all(&self) {
        self.scheduler.start_all();
    }

    pub fn stop_all(&self) {
        self.scheduler.stop_all();
    }

    pub fn info(&self) -> LaunchInfo {
        self.scheduler.info()
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wait_for_seconds;

    #[test]
    fn idle_launcher_ignores_physics_ticks() {
        let launcher = Launcher::default();
        let timer = launcher.start_coroutine(wait_for_seconds(1.0));

        launcher.physics_process(5.0);
        assert!(!timer.is_done());

        launcher.process(1.0);
        assert!(timer.is_done());
    }

    #[test]
    fn physics_launcher_ignores_frame_ticks() {
        let launcher = Launcher::new(SchedulerConfig::new(true, ProcessMode::Physics));
        let timer = launcher.start_coroutine(wait_for_seconds(1.0));

        launcher.process(5.0);
        assert!(!timer.is_done());

        launcher.physics_process(0.5);
        launcher.set_mode(ProcessMode::Idle);
        launcher.process(0.5);
        assert!(timer.is_done());
        assert_eq!(launcher.mode(), ProcessMode::Idle);
    }

    #[test]
    fn clones_share_mode_and_tasks() {
        let launcher = Launcher::default();
        let other = launcher.clone();
        let timer = other.start_coroutine(wait_for_seconds(0.5));

        other.set_mode(ProcessMode::Physics);
        assert_eq!(launcher.mode(), ProcessMode::Physics);

        launcher.process(1.0);
        assert!(!timer.is_done());
        launcher.physics_process(1.0);
        assert!(timer.is_done());
    }

    #[test]
    fn forwards_to_scheduler() {
        let launcher = Launcher::default();
        let timer = launcher.start_coroutine(wait_for_seconds(1.0));
        assert_eq!(launcher.info().total, 1);

        launcher.stop_coroutine(&timer);
        launcher.process(0.0);
        assert_eq!(launcher.info().total, 0);
        assert_eq!(launcher.scheduler().kill_count(), 1);
    }
}
