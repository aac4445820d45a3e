//! Guard-and-intruder scenario.
//!
//! A scripted coroutine reveals an intruder after a delay and waits until the
//! guard catches it. The guard is a [`StateMachine`] over two behavior trees:
//! a patrol tree, and an alert tree that chases and catches. Both trees read
//! and write a [`Blackboard`]; the host copies coroutine signals into it
//! once per frame.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use behavior_tree::builder::{action, condition, selector, sequencer};
use behavior_tree::{Behavior, Blackboard, BlackboardError, NodeCore, State, StateMachine, Status};
use coroutine::{Launcher, Steps, Task, Yield, wait_for_seconds, wait_until};
use tracing::{debug, info, warn};

const PATROL_MIN: f64 = 0.0;
const PATROL_MAX: f64 = 10.0;
const PATROL_SPEED: f64 = 1.5;
const CHASE_SPEED: f64 = 3.0;
const CATCH_RANGE: f64 = 0.5;
const INTRUDER_START: f64 = 14.0;
/// Distance the intruder creeps per scheduler tick while visible.
const INTRUDER_STRIDE: f64 = 0.01;

mod keys {
    pub const GUARD_X: &str = "guard_x";
    pub const HEADING: &str = "heading";
    pub const INTRUDER_X: &str = "intruder_x";
    pub const INTRUDER_VISIBLE: &str = "intruder_visible";
    pub const CAUGHT: &str = "caught";
}

/// State shared between the coroutines and the host.
#[derive(Default)]
struct Signals {
    intruder_visible: Cell<bool>,
    intruder_x: Cell<f64>,
    caught: Cell<bool>,
}

pub struct Scenario {
    board: Blackboard,
    guard: StateMachine<Blackboard>,
    alerted: bool,
    signals: Rc<Signals>,
    script: Task,
}

impl Scenario {
    /// Seeds the blackboard and starts the scenario coroutines on `launcher`.
    pub fn new(launcher: &Launcher) -> Result<Self> {
        let signals = Rc::new(Signals::default());
        signals.intruder_x.set(INTRUDER_START);

        let mut board = Blackboard::new();
        board.add(keys::GUARD_X, PATROL_MIN)?;
        board.add(keys::HEADING, 1.0_f64)?;
        board.add(keys::INTRUDER_X, INTRUDER_START)?;
        board.add(keys::INTRUDER_VISIBLE, false)?;
        board.add(keys::CAUGHT, false)?;

        let mut guard = StateMachine::new(Box::new(patrol_tree()));
        guard.ready();
        guard.enter(&mut board);

        let script = launcher.start_coroutine(script(Rc::clone(&signals)));
        launcher.start_coroutine(intruder(Rc::clone(&signals)));

        Ok(Self {
            board,
            guard,
            alerted: false,
            signals,
            script,
        })
    }

    /// Runs the guard AI for one frame.
    pub fn update(&mut self, delta: f64) -> Result<()> {
        let visible = self.signals.intruder_visible.get();
        self.board.set(keys::INTRUDER_VISIBLE, visible);
        self.board.set(keys::INTRUDER_X, self.signals.intruder_x.get());

        if visible && !self.alerted {
            self.alerted = true;
            let mut alert: Box<dyn Behavior<Blackboard>> = alert_tree();
            alert.ready();
            self.guard.change_state(Box::new(alert), &mut self.board);
            let guard_x = *self.board.get::<f64>(keys::GUARD_X)?;
            info!(guard_x, "guard alerted");
        }

        self.guard.process(&mut self.board, delta);

        if *self.board.get::<bool>(keys::CAUGHT)? && !self.signals.caught.get() {
            self.signals.caught.set(true);
            let guard_x = *self.board.get::<f64>(keys::GUARD_X)?;
            info!(guard_x, "intruder caught");
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.script.is_done()
    }
}

/// Reveals the intruder after a delay, then waits for the catch.
fn script(signals: Rc<Signals>) -> Task {
    let mut stage = 0;
    Task::new(Steps::from_fn(move || {
        stage += 1;
        match stage {
            1 => Some(wait_for_seconds(2.0).into()),
            2 => {
                info!("intruder spotted");
                signals.intruder_visible.set(true);
                let signals = Rc::clone(&signals);
                Some(wait_until(move || signals.caught.get()).into())
            }
            3 => Some(wait_for_seconds(1.0).into()),
            _ => {
                info!("script complete");
                None
            }
        }
    }))
}

/// Moves the intruder toward the patrol area every tick until caught.
fn intruder(signals: Rc<Signals>) -> Task {
    Task::new(Steps::from_fn(move || {
        if signals.caught.get() {
            return None;
        }
        if signals.intruder_visible.get() {
            let x = (signals.intruder_x.get() - INTRUDER_STRIDE).max(PATROL_MIN);
            signals.intruder_x.set(x);
        }
        Some(Yield::Empty)
    }))
}

fn patrol_tree() -> Box<dyn Behavior<Blackboard>> {
    action(|node: &mut NodeCore, board: &mut Blackboard, delta| {
        let status = match patrol(board, delta) {
            Ok(()) => Status::Running,
            Err(e) => {
                warn!(error = %e, "patrol failed");
                Status::Failure
            }
        };
        node.set_state(status);
    })
}

fn patrol(board: &mut Blackboard, delta: f64) -> Result<(), BlackboardError> {
    let heading = *board.get::<f64>(keys::HEADING)?;
    let guard_x = board.get_mut::<f64>(keys::GUARD_X)?;
    *guard_x += heading * PATROL_SPEED * delta;

    let turn = (*guard_x >= PATROL_MAX && heading > 0.0) || (*guard_x <= PATROL_MIN && heading < 0.0);
    *guard_x = guard_x.clamp(PATROL_MIN, PATROL_MAX);
    if turn {
        debug!(guard_x = *guard_x, "patrol turn");
        board.set(keys::HEADING, -heading);
    }
    Ok(())
}

fn alert_tree() -> Box<dyn Behavior<Blackboard>> {
    selector(vec![
        sequencer(vec![
            condition(|board: &Blackboard| distance(board).is_ok_and(|d| d <= CATCH_RANGE)),
            action(|node: &mut NodeCore, board: &mut Blackboard, _| {
                board.set(keys::CAUGHT, true);
                node.set_state(Status::Success);
            }),
        ]),
        action(|node: &mut NodeCore, board: &mut Blackboard, delta| {
            let status = match chase(board, delta) {
                Ok(()) => Status::Running,
                Err(e) => {
                    warn!(error = %e, "chase failed");
                    Status::Failure
                }
            };
            node.set_state(status);
        }),
    ])
}

fn chase(board: &mut Blackboard, delta: f64) -> Result<(), BlackboardError> {
    let target = *board.get::<f64>(keys::INTRUDER_X)?;
    let guard_x = board.get_mut::<f64>(keys::GUARD_X)?;
    let gap = target - *guard_x;
    let stride = CHASE_SPEED * delta;
    *guard_x += gap.clamp(-stride, stride);
    Ok(())
}

fn distance(board: &Blackboard) -> Result<f64, BlackboardError> {
    Ok((board.get::<f64>(keys::INTRUDER_X)? - board.get::<f64>(keys::GUARD_X)?).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coroutine::SchedulerConfig;

    fn board_at(guard_x: f64, intruder_x: f64) -> Blackboard {
        let mut board = Blackboard::new();
        board.add(keys::GUARD_X, guard_x).unwrap();
        board.add(keys::HEADING, 1.0_f64).unwrap();
        board.add(keys::INTRUDER_X, intruder_x).unwrap();
        board.add(keys::CAUGHT, false).unwrap();
        board
    }

    #[test]
    fn patrol_turns_at_the_edge() {
        let mut board = board_at(PATROL_MAX - 0.1, INTRUDER_START);
        patrol(&mut board, 1.0).unwrap();

        assert_eq!(*board.get::<f64>(keys::GUARD_X).unwrap(), PATROL_MAX);
        assert_eq!(*board.get::<f64>(keys::HEADING).unwrap(), -1.0);
    }

    #[test]
    fn alert_tree_chases_then_catches() {
        let mut tree = alert_tree();
        let mut board = board_at(5.0, 6.0);

        tree.tick(&mut board, 0.1);
        assert_eq!(tree.state(), Status::Running);
        assert!(*board.get::<f64>(keys::GUARD_X).unwrap() > 5.0);

        for _ in 0..10 {
            tree.tick(&mut board, 0.1);
        }
        assert_eq!(tree.state(), Status::Success);
        assert!(*board.get::<bool>(keys::CAUGHT).unwrap());
    }

    #[test]
    fn scenario_runs_to_completion() {
        let launcher = Launcher::new(SchedulerConfig::default());
        let mut scenario = Scenario::new(&launcher).unwrap();

        let delta = 1.0 / 60.0;
        let mut frames = 0;
        while !scenario.is_finished() && frames < 1200 {
            launcher.process(delta);
            scenario.update(delta).unwrap();
            frames += 1;
        }

        assert!(scenario.is_finished());
        assert!(scenario.signals.caught.get());
    }
}
