use std::time::Duration;

use bunny_hop_core::{Command, Event, GameState, Instruction, TokenHandle};
use bunny_hop_system_execution::Execution;
use bunny_hop_system_scheduler::Scheduler;
use bunny_hop_world::{self as world, query, World};

const CADENCE: Duration = Duration::from_millis(1000);

struct Harness {
    world: World,
    execution: Execution<&'static str>,
    timers: Scheduler<&'static str>,
    log: Vec<Event>,
}

impl Harness {
    fn new() -> Self {
        Self {
            world: World::new(),
            execution: Execution::new(CADENCE, "playback"),
            timers: Scheduler::new(),
            log: Vec::new(),
        }
    }

    fn author(&mut self, program: &[Instruction]) {
        for (index, instruction) in program.iter().enumerate() {
            self.submit(Command::AddInstruction {
                instruction: *instruction,
                token: TokenHandle::new(index as u32),
            });
        }
    }

    fn submit(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut follow_up = Vec::new();
            for command in pending.drain(..) {
                let mut events = Vec::new();
                world::apply(&mut self.world, command, &mut events);
                self.execution
                    .handle(&events, &mut self.timers, &mut follow_up);
                self.log.extend(events);
            }
            pending = follow_up;
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.timers.advance(dt);
        while let Some(fired) = self.timers.poll() {
            let mut commands = Vec::new();
            self.execution
                .tick(fired.handle, &mut self.timers, &mut commands);
            for command in commands {
                self.submit(command);
            }
        }
    }

    fn take_log(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }
}

fn steps(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::ActorStepped { .. }))
        .count()
}

fn unresolved_transitions(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::StateChanged {
                    to: GameState::Unresolved,
                    ..
                }
            )
        })
        .count()
}

#[test]
fn first_instruction_plays_immediately_and_the_rest_on_cadence() {
    let mut harness = Harness::new();
    harness.author(&[
        Instruction::Forward,
        Instruction::TurnLeft,
        Instruction::Forward,
    ]);
    let _ = harness.take_log();

    harness.submit(Command::StartProgram);
    let started = harness.take_log();
    assert_eq!(steps(&started), 1, "first instruction must not wait for a tick");
    assert_eq!(query::state(&harness.world), GameState::Running);

    harness.advance(CADENCE - Duration::from_millis(1));
    assert!(harness.take_log().is_empty());

    harness.advance(Duration::from_millis(1));
    let turned = harness.take_log();
    assert!(matches!(turned.as_slice(), [Event::HeadingChanged { .. }]));

    harness.advance(CADENCE);
    assert_eq!(steps(&harness.take_log()), 1);
    assert_eq!(query::state(&harness.world), GameState::Running);

    harness.advance(CADENCE);
    assert_eq!(unresolved_transitions(&harness.take_log()), 1);
    assert_eq!(query::state(&harness.world), GameState::Unresolved);
    assert_eq!(harness.execution.counter(), 3);
}

#[test]
fn single_forward_moves_one_increment_then_concludes_once() {
    let mut harness = Harness::new();
    let start = query::actor_position(&harness.world);
    harness.author(&[Instruction::Forward]);

    harness.submit(Command::StartProgram);
    let moved = query::actor_position(&harness.world);
    assert!((moved.x - start.x - 0.12).abs() < 1e-9);
    assert!((moved.y - start.y).abs() < 1e-12);
    assert_eq!(query::state(&harness.world), GameState::Running);
    let _ = harness.take_log();

    harness.advance(Duration::from_secs(10));

    let log = harness.take_log();
    assert_eq!(unresolved_transitions(&log), 1);
    assert_eq!(steps(&log), 0);
    assert!(!harness.execution.is_running());
    assert_eq!(harness.timers.pending(), 0, "playback timer must be disarmed");
    assert!(query::program(&harness.world).is_empty());
}

#[test]
fn level_reset_disarms_playback() {
    let mut harness = Harness::new();
    harness.author(&[Instruction::Forward; 4]);
    harness.submit(Command::StartProgram);
    harness.advance(CADENCE);

    harness.submit(Command::ResetLevel);
    let _ = harness.take_log();
    harness.advance(Duration::from_secs(10));

    assert!(harness.take_log().is_empty());
    assert_eq!(query::state(&harness.world), GameState::Idle);
    assert_eq!(
        query::actor_position(&harness.world),
        query::start_cell(&harness.world).position()
    );
}

#[test]
fn ticks_from_foreign_handles_are_ignored() {
    let mut harness = Harness::new();
    harness.author(&[Instruction::Forward, Instruction::Forward]);
    harness.submit(Command::StartProgram);

    let foreign = harness
        .timers
        .schedule_once(Duration::from_millis(10), "other");
    let mut commands = Vec::new();
    harness
        .execution
        .tick(foreign, &mut harness.timers, &mut commands);

    assert!(commands.is_empty());
    assert_eq!(harness.execution.counter(), 0);
}

#[test]
fn repeated_runs_replay_identically() {
    fn replay() -> Vec<Event> {
        let mut harness = Harness::new();
        harness.author(&[
            Instruction::Forward,
            Instruction::TurnRight,
            Instruction::Forward,
            Instruction::TurnLeft,
        ]);
        harness.submit(Command::StartProgram);
        for _ in 0..6 {
            harness.advance(Duration::from_millis(700));
        }
        harness.take_log()
    }

    let first = replay();
    assert_eq!(first, replay(), "replay diverged between runs");
    assert_eq!(unresolved_transitions(&first), 1);
}
